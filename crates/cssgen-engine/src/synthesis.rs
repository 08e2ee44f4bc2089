//! Build specs for synthesized elements
//!
//! Folds a compound group into the element it describes. Only the tag, ids,
//! classes, `[name="value"]` attributes and the `nth-last-child(-n+K)` repeat
//! directive carry meaning; every other token is reported back as skipped.

use cssgen_css::{interpret, CompoundGroup, TokenKind};
use cssgen_dom::ElementTree;

use crate::MaterializeError;

/// What to build for one compound group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSpec {
    pub tag: String,
    /// Last `#id` wins
    pub id: Option<String>,
    /// Class names in first-seen order, without duplicates
    pub classes: Vec<String>,
    /// Attributes in first-seen order; a repeated name keeps its last value
    pub attributes: Vec<(String, String)>,
    /// Raw repeat directive, before range checks
    pub multiplier: Option<i64>,
    /// Source text of tokens that have no synthesis meaning
    pub skipped: Vec<String>,
}

impl BuildSpec {
    /// Fold `group` into a spec; the group must start with a tag
    pub fn from_group(group: &CompoundGroup) -> Result<Self, MaterializeError> {
        let (first, rest) = group
            .tokens()
            .split_first()
            .ok_or_else(|| MaterializeError::InvalidSynthesis {
                group: group.source().to_string(),
            })?;
        let TokenKind::Tag(tag) = &first.kind else {
            return Err(MaterializeError::InvalidSynthesis {
                group: group.source().to_string(),
            });
        };

        let mut spec = Self {
            tag: tag.clone(),
            ..Self::default()
        };

        for token in rest {
            match &token.kind {
                TokenKind::Id(id) => spec.id = Some(id.clone()),
                TokenKind::Class(class) => {
                    if !spec.classes.contains(class) {
                        spec.classes.push(class.clone());
                    }
                }
                TokenKind::AttributeEquals { name, value } => {
                    match spec.attributes.iter_mut().find(|(n, _)| n == name) {
                        Some((_, existing)) => *existing = value.clone(),
                        None => spec.attributes.push((name.clone(), value.clone())),
                    }
                }
                TokenKind::PseudoFunctionEquation(_) if spec.multiplier.is_none() => {
                    match interpret(token) {
                        Some(multiplier) => spec.multiplier = Some(multiplier),
                        None => spec.skipped.push(token.source.clone()),
                    }
                }
                _ => spec.skipped.push(token.source.clone()),
            }
        }

        Ok(spec)
    }

    /// Create the detached template element
    pub fn create_template<T: ElementTree>(&self, tree: &mut T) -> T::Node {
        let node = tree.create_element(&self.tag);
        if let Some(id) = &self.id {
            tree.set_id(node, id);
        }
        for class in &self.classes {
            tree.add_class(node, class);
        }
        for (name, value) in &self.attributes {
            tree.set_attribute(node, name, value);
        }
        node
    }
}
