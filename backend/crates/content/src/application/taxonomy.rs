//! Taxonomy Use Case
//!
//! Categories and genres: listed by anyone, created and deleted by admins.

use std::sync::Arc;

use auth::policy::{Action, Actor, Resource};

use crate::application::access::require;
use crate::domain::entity::{Taxon, TaxonKind};
use crate::domain::repository::TaxonRepository;
use crate::domain::value_object::Slug;
use crate::error::ContentResult;

pub struct TaxonomyUseCase<R>
where
    R: TaxonRepository,
{
    repo: Arc<R>,
    kind: TaxonKind,
}

impl<R> TaxonomyUseCase<R>
where
    R: TaxonRepository,
{
    pub fn new(repo: Arc<R>, kind: TaxonKind) -> Self {
        Self { repo, kind }
    }

    pub async fn list(&self, actor: &Actor, search: Option<&str>) -> ContentResult<Vec<Taxon>> {
        require(actor, Action::Read, Resource::Catalog)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo.list_taxa(self.kind, search).await
    }

    pub async fn create(&self, actor: &Actor, name: String, slug: String) -> ContentResult<Taxon> {
        require(actor, Action::Create, Resource::Catalog)?;

        let taxon = Taxon::new(name, slug)?;
        self.repo.create_taxon(self.kind, &taxon).await?;

        tracing::info!(kind = %self.kind, slug = %taxon.slug, "Taxon created");
        Ok(taxon)
    }

    pub async fn delete(&self, actor: &Actor, slug: &str) -> ContentResult<()> {
        require(actor, Action::Delete, Resource::Catalog)?;

        let Ok(slug) = Slug::new(slug) else {
            return Err(self.kind.not_found());
        };
        if !self.repo.delete_taxon(self.kind, &slug).await? {
            return Err(self.kind.not_found());
        }

        tracing::info!(kind = %self.kind, slug = %slug, "Taxon deleted");
        Ok(())
    }
}
