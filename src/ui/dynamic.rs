use regex::Regex;
use std::any::TypeId;
use std::collections::HashMap;

use super::item::Item;
use super::UiError;
use crate::error::Result;
use crate::types::interaction::Interaction;

/// An item that can be rebuilt from its custom id alone.
///
/// The custom id encodes the item's state, e.g. `counter:(?P<count>\d+)`.
/// Once registered with
/// [`ViewStore::add_dynamic_items`](super::ViewStore::add_dynamic_items),
/// every component interaction whose custom id matches the template is
/// routed to a freshly built item, with or without a live view.
pub trait DynamicItem: Item + Sized {
    /// Regex the whole custom id must match.
    fn template() -> &'static str;

    fn from_custom_id(interaction: &Interaction, captures: &TemplateMatch) -> Result<Self>;
}

/// Captures of a template match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateMatch {
    full: String,
    named: HashMap<String, String>,
    positional: Vec<Option<String>>,
}

impl TemplateMatch {
    pub(crate) fn capture(regex: &Regex, custom_id: &str) -> Option<Self> {
        let captures = regex.captures(custom_id)?;
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        let positional = captures
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        Some(Self {
            full: custom_id.to_string(),
            named,
            positional,
        })
    }

    /// The whole custom id.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Named group.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Numbered group; 0 is the whole match.
    pub fn index(&self, index: usize) -> Option<&str> {
        self.positional.get(index)?.as_deref()
    }
}

type BuildFn = fn(&Interaction, &TemplateMatch) -> Result<Box<dyn Item>>;

/// A registered [`DynamicItem`] type.
pub(crate) struct DynamicFactory {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    regex: Regex,
    build: BuildFn,
}

fn build<T: DynamicItem>(interaction: &Interaction, captures: &TemplateMatch) -> Result<Box<dyn Item>> {
    Ok(Box::new(T::from_custom_id(interaction, captures)?))
}

impl DynamicFactory {
    pub(crate) fn new<T: DynamicItem>() -> Result<Self, UiError> {
        let template = T::template();
        let regex = Regex::new(&format!("^(?:{template})$")).map_err(|err| {
            UiError::InvalidTemplate {
                template: template.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            regex,
            build: build::<T>,
        })
    }

    pub(crate) fn matches(&self, custom_id: &str) -> Option<TemplateMatch> {
        TemplateMatch::capture(&self.regex, custom_id)
    }

    pub(crate) fn build(
        &self,
        interaction: &Interaction,
        captures: &TemplateMatch,
    ) -> Result<Box<dyn Item>> {
        (self.build)(interaction, captures)
    }
}

impl std::fmt::Debug for DynamicFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicFactory")
            .field("type", &self.type_name)
            .field("template", &self.regex.as_str())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::interaction::tests::interaction_json;
    use crate::ui::{Button, ItemContext};
    use async_trait::async_trait;
    use serde_json::json;
    use std::any::Any;

    /// Button whose custom id carries a running count.
    pub(crate) struct Counter {
        pub(crate) count: u64,
        button: Button,
    }

    impl Counter {
        pub(crate) fn new(count: u64) -> Self {
            Self {
                count,
                button: Button::new(count.to_string()).custom_id(format!("counter:{count}")),
            }
        }
    }

    #[async_trait]
    impl Item for Counter {
        fn component_type(&self) -> crate::types::component::ComponentType {
            self.button.component_type()
        }

        fn custom_id(&self) -> Option<&str> {
            Item::custom_id(&self.button)
        }

        fn to_component(&self) -> crate::types::component::Component {
            self.button.to_component()
        }

        async fn callback(&mut self, ctx: ItemContext) -> Result<()> {
            *self = Counter::new(self.count + 1);
            ctx.refresh_view();
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl DynamicItem for Counter {
        fn template() -> &'static str {
            r"counter:(?P<count>\d+)"
        }

        fn from_custom_id(_interaction: &Interaction, captures: &TemplateMatch) -> Result<Self> {
            let count = captures
                .get("count")
                .and_then(|count| count.parse().ok())
                .ok_or_else(|| crate::error::Error::custom("bad counter id"))?;
            Ok(Counter::new(count))
        }
    }

    struct Broken;

    #[async_trait]
    impl Item for Broken {
        fn component_type(&self) -> crate::types::component::ComponentType {
            crate::types::component::ComponentType::Button
        }

        fn to_component(&self) -> crate::types::component::Component {
            Button::new("").to_component()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl DynamicItem for Broken {
        fn template() -> &'static str {
            "unclosed("
        }

        fn from_custom_id(_: &Interaction, _: &TemplateMatch) -> Result<Self> {
            Ok(Broken)
        }
    }

    #[test]
    fn template_must_match_whole_id() {
        let factory = DynamicFactory::new::<Counter>().unwrap();
        let captures = factory.matches("counter:41").unwrap();
        assert_eq!(captures.get("count"), Some("41"));
        assert_eq!(captures.index(1), Some("41"));
        assert_eq!(captures.index(0), Some("counter:41"));
        assert_eq!(captures.as_str(), "counter:41");

        assert!(factory.matches("counter:41:extra").is_none());
        assert!(factory.matches("xcounter:41").is_none());
    }

    #[test]
    fn builds_the_item() {
        let factory = DynamicFactory::new::<Counter>().unwrap();
        let interaction: Interaction = serde_json::from_value(interaction_json(
            3,
            json!({"custom_id": "counter:7", "component_type": 2}),
        ))
        .unwrap();
        let captures = factory.matches("counter:7").unwrap();
        let item = factory.build(&interaction, &captures).unwrap();
        assert_eq!(item.custom_id(), Some("counter:7"));
        assert_eq!(crate::ui::item::downcast::<Counter>(&*item).map(|c| c.count), Some(7));
    }

    #[test]
    fn invalid_template_is_reported() {
        assert!(matches!(
            DynamicFactory::new::<Broken>(),
            Err(UiError::InvalidTemplate { .. })
        ));
    }
}
