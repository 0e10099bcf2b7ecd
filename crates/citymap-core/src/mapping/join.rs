//! Join definitions between tables.
//!
//! A join describes one foreign-key edge ([`Join`], [`ReverseJoin`]) or a
//! two-legged edge through an association table ([`JoinTable`]). Joins carry
//! no references to other entities, so their checks only need to know the
//! context they appear in.

use serde::{Deserialize, Serialize};

use super::reference::TypeKind;
use super::value::{Condition, TreeHierarchy};
use crate::error::MappingError;

/// Placeholder for the table of the join target, substituted at query time.
pub const TARGET_TABLE_TOKEN: &str = "${target.table}";

/// Placeholder for the objectClassId of the join target.
pub const TARGET_OBJECTCLASS_ID_TOKEN: &str = "${target.objectclass_id}";

/// Placeholder for the id of the join target.
pub const TARGET_ID_TOKEN: &str = "${target.id}";

/// Which side of a join holds the foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRole {
    /// The joined table is the parent (the "one" side).
    #[default]
    Parent,
    /// The joined table is the child (the "many" side).
    Child,
}

/// A single column-to-column join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    /// Joined table.
    pub table: String,
    /// Column of the source table.
    pub from: String,
    /// Column of the joined table.
    pub to: String,
    /// Role of the joined table.
    #[serde(default)]
    pub to_role: JoinRole,
    /// Additional filters on the joined table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Recursive hierarchy stored in the joined table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_hierarchy: Option<TreeHierarchy>,
}

impl Join {
    /// Create a join to `table` on `from = to`.
    pub fn new(table: impl Into<String>, from: impl Into<String>, to: impl Into<String>, to_role: JoinRole) -> Self {
        Self {
            table: table.into(),
            from: from.into(),
            to: to.into(),
            to_role,
            conditions: Vec::new(),
            tree_hierarchy: None,
        }
    }

    /// Add a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the tree hierarchy.
    pub fn with_tree_hierarchy(mut self, tree_hierarchy: TreeHierarchy) -> Self {
        self.tree_hierarchy = Some(tree_hierarchy);
        self
    }

    /// Whether the joined table is only known once the target type is.
    pub fn targets_token_table(&self) -> bool {
        self.table == TARGET_TABLE_TOKEN
    }

    /// Validate the join against the element it is declared on.
    pub fn validate(&self, context: JoinParent, element: &str) -> Result<(), MappingError> {
        validate_columns(&self.table, &self.from, &self.to, context, element)?;

        for condition in &self.conditions {
            if condition.column.is_empty() {
                return Err(MappingError::missing(element, "condition column"));
            }
            if condition.value.is_empty() {
                return Err(MappingError::missing(element, "condition value"));
            }
            validate_identity_token(&condition.value, context, element)?;
        }

        if let Some(tree) = &self.tree_hierarchy {
            if tree.parent_column.is_empty() {
                return Err(MappingError::missing(element, "treeHierarchy parentColumn"));
            }
            if tree.root_column.is_empty() {
                return Err(MappingError::missing(element, "treeHierarchy rootColumn"));
            }
        }

        Ok(())
    }
}

/// A join traversed from the referenced table back to the referencing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseJoin {
    /// Table holding the foreign key.
    pub table: String,
    /// Foreign key column.
    pub from: String,
    /// Referenced column.
    pub to: String,
}

impl ReverseJoin {
    /// Create a reverse join.
    pub fn new(table: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A join through an association table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTable {
    /// Association table.
    pub table: String,
    /// Leg from the owner to the association table.
    pub join: Option<Join>,
    /// Leg from the association table to the target.
    pub inverse_join: Option<Join>,
}

impl JoinTable {
    /// Create a join table with both legs.
    pub fn new(table: impl Into<String>, join: Join, inverse_join: Join) -> Self {
        Self {
            table: table.into(),
            join: Some(join),
            inverse_join: Some(inverse_join),
        }
    }
}

/// Any join variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AbstractJoin {
    Join(Join),
    ReverseJoin(ReverseJoin),
    JoinTable(JoinTable),
}

impl AbstractJoin {
    /// The table this join leads to.
    pub fn table(&self) -> &str {
        match self {
            AbstractJoin::Join(join) => &join.table,
            AbstractJoin::ReverseJoin(join) => &join.table,
            AbstractJoin::JoinTable(join) => &join.table,
        }
    }
}

impl From<Join> for AbstractJoin {
    fn from(join: Join) -> Self {
        AbstractJoin::Join(join)
    }
}

impl From<ReverseJoin> for AbstractJoin {
    fn from(join: ReverseJoin) -> Self {
        AbstractJoin::ReverseJoin(join)
    }
}

impl From<JoinTable> for AbstractJoin {
    fn from(join: JoinTable) -> Self {
        AbstractJoin::JoinTable(join)
    }
}

/// Element a join is declared on or is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinParent {
    /// A type, via its extension or as owner of a property.
    Type(TypeKind),
    /// A property injection.
    Injection,
    /// A complex attribute type owning an attribute.
    AttributeType,
    /// A property; `target` is set for type-valued properties.
    Property {
        /// Kind of the property's target type.
        target: Option<TypeKind>,
    },
}

impl JoinParent {
    fn exposes_target_table(&self) -> bool {
        match self {
            JoinParent::Type(_) | JoinParent::Injection => true,
            JoinParent::AttributeType => false,
            JoinParent::Property { target } => target.is_some(),
        }
    }

    fn exposes_target_identity(&self) -> bool {
        match self {
            JoinParent::Type(kind) => kind.is_object_kind(),
            JoinParent::Injection => true,
            JoinParent::AttributeType => false,
            JoinParent::Property { target } => target.map(|k| k.is_object_kind()).unwrap_or(false),
        }
    }
}

/// Validate a join against its parent and the parent's owner.
///
/// Single-edge joins are checked against `parent`. A join table requires a
/// type-valued property as parent and a type or injection as transitive
/// parent; its `join` leg is checked against the transitive parent and its
/// `inverse_join` leg against the parent.
pub fn validate_join(
    join: &AbstractJoin,
    parent: JoinParent,
    transitive_parent: Option<JoinParent>,
    element: &str,
) -> Result<(), MappingError> {
    match join {
        AbstractJoin::Join(join) => join.validate(parent, element),
        AbstractJoin::ReverseJoin(join) => {
            validate_columns(&join.table, &join.from, &join.to, parent, element)
        }
        AbstractJoin::JoinTable(join_table) => {
            if join_table.table.is_empty() {
                return Err(MappingError::missing(element, "joinTable table"));
            }
            if !matches!(parent, JoinParent::Property { target: Some(_) }) {
                return Err(MappingError::join_context(
                    element,
                    "a join table must be declared on a type-valued property",
                ));
            }
            let transitive_parent = match transitive_parent {
                Some(p @ (JoinParent::Type(_) | JoinParent::Injection)) => p,
                _ => {
                    return Err(MappingError::join_context(
                        element,
                        "the property owning a join table must belong to a type or a property injection",
                    ))
                }
            };
            let join = join_table
                .join
                .as_ref()
                .ok_or_else(|| MappingError::missing(element, "joinTable join"))?;
            let inverse_join = join_table
                .inverse_join
                .as_ref()
                .ok_or_else(|| MappingError::missing(element, "joinTable inverseJoin"))?;
            join.validate(transitive_parent, element)?;
            inverse_join.validate(parent, element)
        }
    }
}

fn validate_columns(
    table: &str,
    from: &str,
    to: &str,
    context: JoinParent,
    element: &str,
) -> Result<(), MappingError> {
    if table.is_empty() {
        return Err(MappingError::missing(element, "join table"));
    }
    if from.is_empty() {
        return Err(MappingError::missing(element, "join from"));
    }
    if to.is_empty() {
        return Err(MappingError::missing(element, "join to"));
    }
    if table == TARGET_TABLE_TOKEN && !context.exposes_target_table() {
        return Err(MappingError::join_context(
            element,
            format!("{} is only allowed where a target type is known", TARGET_TABLE_TOKEN),
        ));
    }
    validate_identity_token(from, context, element)?;
    validate_identity_token(to, context, element)
}

fn validate_identity_token(value: &str, context: JoinParent, element: &str) -> Result<(), MappingError> {
    if (value == TARGET_OBJECTCLASS_ID_TOKEN || value == TARGET_ID_TOKEN)
        && !context.exposes_target_identity()
    {
        return Err(MappingError::join_context(
            element,
            format!("{} requires an object or feature target", value),
        ));
    }
    Ok(())
}
