//! Titles Use Case

use std::sync::Arc;

use auth::policy::{Action, Actor, Resource};
use kernel::id::TitleId;

use crate::application::access::require;
use crate::domain::entity::{Title, TitleChanges, TitleDraft, TitleFilter, TitleInput};
use crate::domain::repository::TitleRepository;
use crate::error::{ContentError, ContentResult};

pub struct TitlesUseCase<R>
where
    R: TitleRepository,
{
    repo: Arc<R>,
}

impl<R> TitlesUseCase<R>
where
    R: TitleRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, actor: &Actor, filter: &TitleFilter) -> ContentResult<Vec<Title>> {
        require(actor, Action::Read, Resource::Catalog)?;
        self.repo.list_titles(filter).await
    }

    pub async fn get(&self, actor: &Actor, title_id: TitleId) -> ContentResult<Title> {
        require(actor, Action::Read, Resource::Catalog)?;
        self.find(title_id).await
    }

    pub async fn create(&self, actor: &Actor, input: TitleInput) -> ContentResult<Title> {
        require(actor, Action::Create, Resource::Catalog)?;

        let draft = TitleDraft::new(input)?;
        let title = self.repo.create_title(&draft).await?;

        tracing::info!(title_id = %title.id, name = %title.name, "Title created");
        Ok(title)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        title_id: TitleId,
        changes: TitleChanges,
    ) -> ContentResult<Title> {
        require(actor, Action::Update, Resource::Catalog)?;

        let current = self.find(title_id).await?;
        let draft = changes.apply(&current)?;
        let title = self.repo.update_title(title_id, &draft).await?;

        tracing::info!(title_id = %title.id, "Title updated");
        Ok(title)
    }

    pub async fn delete(&self, actor: &Actor, title_id: TitleId) -> ContentResult<()> {
        require(actor, Action::Delete, Resource::Catalog)?;

        if !self.repo.delete_title(title_id).await? {
            return Err(ContentError::TitleNotFound);
        }

        tracing::info!(title_id = %title_id, "Title deleted");
        Ok(())
    }

    async fn find(&self, title_id: TitleId) -> ContentResult<Title> {
        self.repo
            .find_title(title_id)
            .await?
            .ok_or(ContentError::TitleNotFound)
    }
}
