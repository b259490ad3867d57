//! The schema registry: a closed, statically known set of entity
//! descriptors mapping each tabular record type onto the graph.
//!
//! Each descriptor declares the node label, the merge key (table column →
//! node property), the properties copied onto the node (with declared
//! numeric coercions), and at most one relationship rule. Adding an entity
//! type means adding a descriptor here; nothing elsewhere branches on
//! entity identity beyond looking its descriptor up.
//!
//! Labels, relationship types, and property names are part of the external
//! graph schema and must not change:
//! nodes `Dataset` / `Project` / `Loan` / `Disbursement` / `Country`,
//! relationships `IMPLEMENTED_IN` / `ISSUED_TO` / `HAS_DISBURSEMENT`.

pub mod errors;

use std::collections::HashMap;

use lazy_static::lazy_static;

use self::errors::SchemaError;

/// The supported record types, keyed by input file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Dataset,
    Project,
    Loan,
    Disbursement,
}

impl EntityKind {
    /// Map an input file stem (`datasets.json` → `datasets`) to its kind.
    pub fn from_stem(stem: &str) -> Result<EntityKind, SchemaError> {
        REGISTRY_BY_STEM
            .get(stem)
            .map(|d| d.kind)
            .ok_or_else(|| SchemaError::UnknownEntity {
                name: stem.to_string(),
            })
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(descriptor(*self).label)
    }
}

/// Declared coercion applied to a property value at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    None,
    /// Amount-style properties are stored as floats; an uncoercible
    /// non-nil cell is a row-level [`SchemaError`].
    Float,
}

/// One column copied onto a node, possibly under a different property name.
#[derive(Debug, Clone, Copy)]
pub struct PropertyMapping {
    pub column: &'static str,
    pub property: &'static str,
    pub coerce: Coercion,
}

const fn prop(column: &'static str, property: &'static str) -> PropertyMapping {
    PropertyMapping {
        column,
        property,
        coerce: Coercion::None,
    }
}

const fn float_prop(column: &'static str, property: &'static str) -> PropertyMapping {
    PropertyMapping {
        column,
        property,
        coerce: Coercion::Float,
    }
}

/// Edge direction relative to the primary node of the table being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// primary -[type]-> target
    FromPrimary,
    /// target -[type]-> primary (e.g. `Loan -[:HAS_DISBURSEMENT]-> Disbursement`)
    ToPrimary,
}

/// Whether the relationship target is upserted or must already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Merge the target node (creating it on first sight), e.g. `Country`.
    Merge,
    /// Match an existing target; a missing target is a row-level
    /// referential-integrity failure, e.g. `Disbursement` → `Loan`.
    MatchExisting,
}

/// The zero-or-one outgoing relationship rule of a descriptor.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipDescriptor {
    pub rel_type: &'static str,
    pub direction: Direction,
    pub target_label: &'static str,
    /// Table column holding the target's merge-key value.
    pub target_key_column: &'static str,
    /// Property name of the merge key on the target node.
    pub target_key_property: &'static str,
    pub target_properties: &'static [PropertyMapping],
    pub target_mode: TargetMode,
}

/// Immutable mapping rule from one record type to the graph.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub label: &'static str,
    /// Input file stem this descriptor is dispatched on.
    pub stem: &'static str,
    /// Table column holding the natural unique identifier.
    pub merge_key_column: &'static str,
    /// Property name the merge key is stored under on the node.
    pub merge_key_property: &'static str,
    pub properties: &'static [PropertyMapping],
    pub relationship: Option<RelationshipDescriptor>,
}

const COUNTRY_PROPERTIES: &[PropertyMapping] = &[prop("country_name", "name")];

static DESCRIPTORS: [EntityDescriptor; 4] = [
    EntityDescriptor {
        kind: EntityKind::Dataset,
        label: "Dataset",
        stem: "datasets",
        merge_key_column: "id",
        merge_key_property: "id",
        properties: &[
            prop("name", "name"),
            prop("description", "description"),
            prop("lastUpdated", "lastUpdated"),
        ],
        relationship: None,
    },
    EntityDescriptor {
        kind: EntityKind::Project,
        label: "Project",
        stem: "projects",
        merge_key_column: "id",
        merge_key_property: "id",
        properties: &[
            prop("name", "name"),
            prop("status", "status"),
            prop("start_date", "startDate"),
            prop("end_date", "endDate"),
        ],
        relationship: Some(RelationshipDescriptor {
            rel_type: "IMPLEMENTED_IN",
            direction: Direction::FromPrimary,
            target_label: "Country",
            target_key_column: "country_code",
            target_key_property: "code",
            target_properties: COUNTRY_PROPERTIES,
            target_mode: TargetMode::Merge,
        }),
    },
    EntityDescriptor {
        kind: EntityKind::Loan,
        label: "Loan",
        stem: "loans",
        merge_key_column: "loan_number",
        merge_key_property: "id",
        properties: &[
            float_prop("original_principal_amount", "amount"),
            prop("loan_status", "status"),
            prop("approval_date", "approvalDate"),
        ],
        relationship: Some(RelationshipDescriptor {
            rel_type: "ISSUED_TO",
            direction: Direction::FromPrimary,
            target_label: "Country",
            target_key_column: "country_code",
            target_key_property: "code",
            target_properties: COUNTRY_PROPERTIES,
            target_mode: TargetMode::Merge,
        }),
    },
    EntityDescriptor {
        kind: EntityKind::Disbursement,
        label: "Disbursement",
        stem: "disbursements",
        merge_key_column: "disbursement_id",
        merge_key_property: "id",
        properties: &[
            float_prop("amount", "amount"),
            prop("disbursement_date", "date"),
        ],
        relationship: Some(RelationshipDescriptor {
            rel_type: "HAS_DISBURSEMENT",
            direction: Direction::ToPrimary,
            target_label: "Loan",
            target_key_column: "loan_number",
            target_key_property: "id",
            target_properties: &[],
            target_mode: TargetMode::MatchExisting,
        }),
    },
];

lazy_static! {
    static ref REGISTRY_BY_STEM: HashMap<&'static str, &'static EntityDescriptor> =
        DESCRIPTORS.iter().map(|d| (d.stem, d)).collect();
}

pub fn descriptors() -> &'static [EntityDescriptor] {
    &DESCRIPTORS
}

pub fn descriptor(kind: EntityKind) -> &'static EntityDescriptor {
    DESCRIPTORS
        .iter()
        .find(|d| d.kind == kind)
        .expect("every EntityKind has a descriptor")
}

/// Look a descriptor up by input file stem.
pub fn descriptor_for_stem(stem: &str) -> Result<&'static EntityDescriptor, SchemaError> {
    REGISTRY_BY_STEM
        .get(stem)
        .copied()
        .ok_or_else(|| SchemaError::UnknownEntity {
            name: stem.to_string(),
        })
}

/// Distinct (label, merge-key property) pairs across all descriptors,
/// relationship targets included. One uniqueness constraint is issued per
/// pair before any load.
pub fn constraint_pairs() -> Vec<(&'static str, &'static str)> {
    let mut pairs: Vec<(&'static str, &'static str)> = Vec::new();
    let mut push = |pair: (&'static str, &'static str)| {
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    };
    for d in DESCRIPTORS.iter() {
        push((d.label, d.merge_key_property));
        if let Some(rel) = &d.relationship {
            push((rel.target_label, rel.target_key_property));
        }
    }
    pairs
}
