//! Incremental materializer
//!
//! Walks a parsed selector left to right, querying the tree with the growing
//! prefix at every step. A step that matches becomes the context for the next
//! one; a compound group that matches nothing is synthesized under the
//! current context, so that the prefix matches afterwards.

use cssgen_css::{Item, ParsedSequence};
use cssgen_dom::{CorrelationId, ElementTree, QueryError};

use crate::{BuildSpec, ContentPayload, DeferredBinder};

/// Bounds applied during synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_multiplier: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_multiplier: 1000,
        }
    }
}

/// Rule-fatal materialization failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaterializeError {
    #[error("Nothing to attach {group:?} to: no earlier step matched")]
    Anchor { group: String },

    #[error("Cannot synthesize {group:?}: it does not start with a tag name")]
    InvalidSynthesis { group: String },
}

/// What happened at one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The prefix already matched this many elements
    Matched(usize),
    /// The prefix could not be queried; context left as it was
    Skipped(String),
    /// A combinator step matched nothing; the empty context carries forward
    Propagated,
    /// This many elements were created and attached
    Synthesized(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub prefix: String,
    pub outcome: StepOutcome,
}

/// Trace of one `materialize` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub steps: Vec<Step>,
    /// Elements attached to the tree, clones only
    pub created: usize,
    /// Tokens or directives that were ignored while synthesizing
    pub skipped: Vec<String>,
    /// Id the final template was tagged with, for pending content
    pub correlation: Option<CorrelationId>,
    /// Whether the content payload ended up on a synthesized element
    pub content_bound: bool,
}

/// Resolve `sequence` against `tree`, synthesizing whatever is missing
///
/// The payload is bound only when the last group is synthesized; a rule whose
/// full selector already matches leaves the tree untouched.
pub fn materialize<T: ElementTree>(
    sequence: &ParsedSequence,
    payload: ContentPayload,
    tree: &mut T,
    binder: &mut DeferredBinder,
    limits: &Limits,
) -> Result<MaterializeReport, MaterializeError> {
    let mut report = MaterializeReport::default();
    let mut context: Option<Vec<T::Node>> = None;
    let mut payload = Some(payload);
    let last = sequence.len().saturating_sub(1);

    for (index, item) in sequence.iter().enumerate() {
        let prefix = sequence.prefix(index);

        let matches = match tree.query(&prefix) {
            Ok(matches) => matches,
            Err(QueryError::Unsupported(reason)) => {
                tracing::debug!("Step {:?} skipped: {}", prefix, reason);
                report.steps.push(Step {
                    prefix,
                    outcome: StepOutcome::Skipped(reason),
                });
                continue;
            }
        };

        if !matches.is_empty() {
            tracing::debug!("Step {:?} matched {} element(s)", prefix, matches.len());
            report.steps.push(Step {
                prefix,
                outcome: StepOutcome::Matched(matches.len()),
            });
            context = Some(matches);
            continue;
        }

        let group = match item {
            Item::Combinator(_) => {
                report.steps.push(Step {
                    prefix,
                    outcome: StepOutcome::Propagated,
                });
                context = Some(Vec::new());
                continue;
            }
            Item::Compound(group) => group,
        };

        let parents = match context.take() {
            Some(parents) if !parents.is_empty() => parents,
            _ => {
                return Err(MaterializeError::Anchor {
                    group: group.source().to_string(),
                });
            }
        };

        let spec = BuildSpec::from_group(group)?;
        report.skipped.extend(spec.skipped.iter().cloned());
        let multiplier = checked_multiplier(spec.multiplier, limits, &mut report);

        // Never attached, so the template stays behind in the arena.
        let template = spec.create_template(tree);
        if index == last {
            if let Some(payload) = payload.take() {
                bind(tree, template, payload, binder, &mut report);
            }
        }

        let mut created = Vec::with_capacity(parents.len() * multiplier as usize);
        for &parent in &parents {
            let fresh: Vec<T::Node> = (0..multiplier)
                .map(|repeat| {
                    let copy = tree.clone_deep(template);
                    tree.tag_with_repeat_index(copy, repeat);
                    copy
                })
                .collect();
            tree.append_children(parent, &fresh);
            created.extend(fresh);
        }

        tracing::debug!(
            "Step {:?} synthesized {} x {} under {} parent(s)",
            prefix,
            spec.tag,
            multiplier,
            parents.len()
        );
        report.created += created.len();
        report.steps.push(Step {
            prefix,
            outcome: StepOutcome::Synthesized(created.len()),
        });
        context = Some(created);
    }

    if let Some(payload) = payload.filter(|p| !p.is_absent()) {
        tracing::debug!("Content {:?} dropped: final step was not synthesized", payload);
    }
    Ok(report)
}

/// Range-check a repeat directive; out-of-range values are reported, not fatal
fn checked_multiplier(raw: Option<i64>, limits: &Limits, report: &mut MaterializeReport) -> u32 {
    let Some(raw) = raw else {
        return 1;
    };
    if raw < 1 {
        report.skipped.push(format!("repeat count {raw}"));
        return 1;
    }
    let max = i64::from(limits.max_multiplier.max(1));
    if raw > max {
        tracing::warn!("Repeat count {} clamped to {}", raw, max);
        report.skipped.push(format!("repeat count {raw} above {max}"));
        return max as u32;
    }
    raw as u32
}

fn bind<T: ElementTree>(
    tree: &mut T,
    template: T::Node,
    payload: ContentPayload,
    binder: &mut DeferredBinder,
    report: &mut MaterializeReport,
) {
    match payload {
        ContentPayload::Literal(text) => {
            tree.set_text_content(template, &text);
            report.content_bound = true;
        }
        ContentPayload::Pending(pending) => {
            report.correlation = Some(binder.defer(tree, template, pending));
            report.content_bound = true;
        }
        ContentPayload::Absent => {}
    }
}
