use uuid::Uuid;

/// Identifies records that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides the human-friendly label used in history descriptions.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Records that follow the store's soft-delete convention.
pub trait SoftDeletable {
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

pub(crate) fn default_active() -> bool {
    true
}
