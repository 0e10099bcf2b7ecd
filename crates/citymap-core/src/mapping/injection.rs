//! Property injections: properties added to a feature type from elsewhere.
//!
//! An injection declares properties stored in its own table and attaches
//! them to a base feature type of another schema. Attachment is recorded by
//! the registry; the injection remains the declaring owner.

use super::join::Join;
use super::property::Property;
use super::reference::{Ref, TypeHandle};
use super::value::CityGMLContext;

/// A set of properties injected into a base feature type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInjection {
    /// Table storing the injected properties.
    pub table: String,
    /// Join from the base type's table to the injection table.
    pub join: Option<Join>,
    /// Base feature type used when a property has no override.
    pub default_base: Option<Ref<TypeHandle>>,
    /// Injected properties.
    pub properties: Vec<InjectedProperty>,
}

/// A property declared by an injection.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectedProperty {
    /// The property itself.
    pub property: Property,
    /// Base feature type overriding the injection's default base.
    pub base: Option<Ref<TypeHandle>>,
    /// CityGML version the property is restricted to.
    pub context: Option<CityGMLContext>,
    base_join: Option<Join>,
}

impl PropertyInjection {
    /// Create an injection for `table` joined to its base.
    pub fn new(table: impl Into<String>, join: Join) -> Self {
        Self {
            table: table.into(),
            join: Some(join),
            default_base: None,
            properties: Vec::new(),
        }
    }

    /// Set the default base feature type.
    pub fn with_default_base(mut self, base: impl Into<Ref<TypeHandle>>) -> Self {
        self.default_base = Some(base.into());
        self
    }

    /// Add an injected property.
    pub fn with_property(mut self, property: InjectedProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Label used in error messages.
    pub fn describe(&self) -> String {
        format!("property injection '{}'", self.table)
    }
}

impl InjectedProperty {
    /// Inject a property into the injection's default base.
    pub fn new(property: Property) -> Self {
        Self {
            property,
            base: None,
            context: None,
            base_join: None,
        }
    }

    /// Inject into a specific base feature type.
    pub fn with_base(mut self, base: impl Into<Ref<TypeHandle>>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Restrict the property to a CityGML version.
    pub fn with_context(mut self, context: CityGMLContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Join from the base type's table, inherited from the injection.
    pub fn base_join(&self) -> Option<&Join> {
        self.base_join.as_ref()
    }

    pub(crate) fn set_base_join(&mut self, join: Join) {
        self.base_join = Some(join);
    }

    pub(crate) fn clear_base_join(&mut self) {
        self.base_join = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::join::JoinRole;
    use crate::mapping::value::SimpleType;

    #[test]
    fn test_injection_builder() {
        let injection = PropertyInjection::new("TEST_BUILDING", Join::new("TEST_BUILDING", "ID", "ID", JoinRole::Child))
            .with_default_base("Building")
            .with_property(
                InjectedProperty::new(Property::simple_attribute("ownerName", "test", "OWNERNAME", SimpleType::String))
                    .with_context(CityGMLContext::CityGML2),
            );

        assert_eq!(injection.describe(), "property injection 'TEST_BUILDING'");
        assert_eq!(injection.properties.len(), 1);
        assert!(injection.properties[0].base_join().is_none());
        assert_eq!(injection.properties[0].context, Some(CityGMLContext::CityGML2));
    }
}
