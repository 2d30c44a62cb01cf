//! External collaborators: capability traits, exchanged types, and a replaying implementation

mod recorded;
mod traits;
mod types;

pub use recorded::{RecordedArticle, RecordedLinks, RecordedSources};
pub use traits::{
    ArchiveResolver, ArticleFetcher, HydrationService, LinkLookupService, QueryService,
    TitleLookupService,
};
pub use types::{
    FetchedArticle, HydrationOutcome, PropertyMapping, QueryRow, ServiceError, ServiceResult,
    Snapshot, TitleMap, TitlesByLanguage,
};
