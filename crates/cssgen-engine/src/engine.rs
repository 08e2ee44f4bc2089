//! Engine - Main entry point

use cssgen_css::{
    flatten_rules, parse_selector, CssError, SelectorError, StyleRule, StylesheetLoader,
    StylesheetParser,
};
use cssgen_dom::ElementTree;
use cssgen_net::{FetchJson, NetError, ResourceLoader};

use crate::{
    decode_content, materialize, Config, DeferredBinder, MaterializeError, MaterializeReport,
    SettleReport,
};

/// Rule-fatal error; the engine logs it and moves on to the next rule
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

/// A rule that could not be applied
#[derive(Debug)]
pub struct RuleFailure {
    pub selector: String,
    pub error: RuleError,
}

/// Totals over a batch of rules
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Rules seen
    pub rules: usize,
    /// Rules applied without a rule-fatal error
    pub applied: usize,
    /// Elements attached across all rules
    pub created: usize,
    pub failures: Vec<RuleFailure>,
}

impl ApplyReport {
    fn merge(&mut self, other: ApplyReport) {
        self.rules += other.rules;
        self.applied += other.applied;
        self.created += other.created;
        self.failures.extend(other.failures);
    }
}

/// Applies stylesheet rules to element trees
///
/// Content fetches started while applying rules are held until `settle`.
pub struct Engine<F: FetchJson> {
    config: Config,
    fetcher: F,
    binder: DeferredBinder,
}

impl Engine<ResourceLoader> {
    /// Engine fetching content over the network and from disk, set up from
    /// the config's user agent, timeout and base URL
    pub fn with_network(config: Config) -> Result<Self, NetError> {
        let loader = ResourceLoader::builder()
            .user_agent(&config.user_agent)
            .timeout(config.fetch_timeout())
            .base_url(config.base_url.as_deref())
            .build()?;
        Ok(Self::new(config, loader))
    }
}

impl<F: FetchJson> Engine<F> {
    pub fn new(config: Config, fetcher: F) -> Self {
        tracing::debug!("cssgen engine {} initialized", crate::VERSION);
        Self {
            config,
            fetcher,
            binder: DeferredBinder::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Content fetches waiting for `settle`
    pub fn pending(&self) -> usize {
        self.binder.pending()
    }

    /// Parse one rule's selector, decode its content and materialize it
    pub fn apply_rule<T: ElementTree>(
        &mut self,
        tree: &mut T,
        rule: &StyleRule,
    ) -> Result<MaterializeReport, RuleError> {
        let sequence = parse_selector(&rule.selector_text)?;
        let payload = decode_content(rule.content.as_deref(), &self.fetcher);
        let report = materialize(
            &sequence,
            payload,
            tree,
            &mut self.binder,
            &self.config.limits(),
        )?;
        Ok(report)
    }

    /// Apply rules in order; a failing rule is logged and does not stop the rest
    pub fn apply_rules<T: ElementTree>(&mut self, tree: &mut T, rules: &[StyleRule]) -> ApplyReport {
        let mut report = ApplyReport::default();
        for rule in rules {
            report.rules += 1;
            match self.apply_rule(tree, rule) {
                Ok(outcome) => {
                    report.applied += 1;
                    report.created += outcome.created;
                    if !outcome.skipped.is_empty() {
                        tracing::debug!(
                            "Rule {:?} ignored {}",
                            rule.selector_text,
                            outcome.skipped.join(", ")
                        );
                    }
                }
                Err(error) => {
                    tracing::warn!("Rule {:?} failed: {}", rule.selector_text, error);
                    report.failures.push(RuleFailure {
                        selector: rule.selector_text.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    /// Parse a stylesheet, expand its imports in place and apply every rule
    pub fn apply_stylesheet<T: ElementTree>(
        &mut self,
        tree: &mut T,
        css: &str,
        loader: &dyn StylesheetLoader,
    ) -> Result<ApplyReport, CssError> {
        let sheet = StylesheetParser::new().parse(css)?;
        let rules = flatten_rules(&sheet, loader, self.config.max_import_depth);
        tracing::info!("Applying {} rule(s)", rules.len());
        Ok(self.apply_rules(tree, &rules))
    }

    /// Apply several stylesheets in order, merging their reports
    pub fn apply_stylesheets<'s, T: ElementTree>(
        &mut self,
        tree: &mut T,
        sheets: impl IntoIterator<Item = &'s str>,
        loader: &dyn StylesheetLoader,
    ) -> Result<ApplyReport, CssError> {
        let mut total = ApplyReport::default();
        for css in sheets {
            total.merge(self.apply_stylesheet(tree, css, loader)?);
        }
        Ok(total)
    }

    /// Wait for pending content and bind it, each fetch bounded by the
    /// configured timeout
    pub fn settle<T: ElementTree>(&mut self, tree: &mut T) -> SettleReport {
        let timeout = self.config.fetch_timeout();
        smol::block_on(self.binder.settle(tree, timeout))
    }
}
