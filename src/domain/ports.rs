use crate::core::StudentDb;
use crate::utils::error::Result;

/// Persistence backend for a whole database snapshot.
pub trait RegistryStore {
    /// Replaces the contents of `db` with the stored snapshot.
    fn load_into(&self, db: &mut StudentDb) -> Result<()>;
    fn save(&self, db: &StudentDb) -> Result<()>;
}
