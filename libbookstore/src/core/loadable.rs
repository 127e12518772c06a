//! The trait shared by every object that can be stored in and loaded from the database
use crate::core::{
    database::Database,
    error::Result,
    query::{DynFilterPart, LimitSpec, SortSpecs, ToSql},
};
use async_trait::async_trait;

/// An object that is stored in the database and that can be loaded, inserted,
/// updated and deleted. The id of the object is assigned by the database engine
/// when the object is inserted and is only meaningful to the engine.
#[async_trait]
pub trait Loadable: Send + Sync {
    /// The type of the engine-assigned id
    type Id: Copy + PartialEq + std::fmt::Debug + Send;

    /// The fields that results can be sorted on
    type Sort: ToSql + Send;

    /// The id value that denotes an object that is not stored in the database
    fn invalid_id() -> Self::Id;

    fn id(&self) -> Self::Id;

    /// Mark this object as not being stored in the database
    fn set_invalid(&mut self);

    /// Whether this object has been stored in the database
    fn exists(&self) -> bool {
        self.id() != Self::invalid_id()
    }

    /// Insert this object into the database. When this completes successfully
    /// the id of the object is set to the id assigned by the database
    async fn insert(&mut self, db: &Database) -> Result<&Self::Id>;

    async fn load(id: Self::Id, db: &Database) -> Result<Self>
    where
        Self: Sized;

    async fn load_all(
        filter: Option<DynFilterPart>,
        sort: Option<SortSpecs<Self::Sort>>,
        limit: Option<LimitSpec>,
        db: &Database,
    ) -> Result<Vec<Self>>
    where
        Self: Sized;

    async fn count(filter: Option<DynFilterPart>, db: &Database) -> Result<u64>;

    async fn delete_id(id: &Self::Id, db: &Database) -> Result<()>;

    /// Update the database so that the stored object matches this one
    async fn update(&self, db: &Database) -> Result<()>;

    /// Delete this object from the database and mark it as no longer stored
    async fn delete(&mut self, db: &Database) -> Result<()> {
        Self::delete_id(&self.id(), db).await?;
        self.set_invalid();
        Ok(())
    }
}
