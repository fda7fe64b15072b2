use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::search::session::SearchBackend;

use super::types::{
    DuplicatePage, Entry, EntryDraft, ImageFile, ResultPage, SearchReply, UploadReply,
    WorkbookUpload,
};
use super::ApiClient;

impl ApiClient {
    /// Free-text search. The backend returns either a bare entry list or a
    /// paginated object depending on its version; both normalize to a page.
    pub async fn search_words(
        &self,
        query: &str,
        session: Option<&AuthSession>,
    ) -> Result<ResultPage, ApiError> {
        let req = self
            .client
            .get(self.url("/words/search"))
            .query(&[("q", query)]);
        let response = super::check(Self::with_auth(req, session).send().await?).await?;
        let reply: SearchReply = response.json().await?;
        Ok(reply.into_page())
    }

    pub async fn get_word(
        &self,
        id: &str,
        session: Option<&AuthSession>,
    ) -> Result<Entry, ApiError> {
        let req = self.client.get(self.url(&format!("/words/{id}")));
        let response = super::check(Self::with_auth(req, session).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Paginated word listing with an optional filter query.
    pub async fn list_words(
        &self,
        page: u32,
        limit: u32,
        query: &str,
        session: Option<&AuthSession>,
    ) -> Result<ResultPage, ApiError> {
        let req = self.client.get(self.url("/words")).query(&[
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("q", query.to_string()),
        ]);
        let response = super::check(Self::with_auth(req, session).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Creates an entry, optionally with an attached image. The reply body is
    /// not relied upon; callers refresh their listing afterwards.
    pub async fn create_word(
        &self,
        draft: &EntryDraft,
        image: Option<ImageFile>,
        session: &AuthSession,
    ) -> Result<(), ApiError> {
        let req = self
            .client
            .post(self.url("/words"))
            .bearer_auth(&session.token)
            .multipart(draft_form(draft, image)?);
        super::check(req.send().await?).await?;
        Ok(())
    }

    pub async fn update_word(
        &self,
        id: &str,
        draft: &EntryDraft,
        image: Option<ImageFile>,
        session: &AuthSession,
    ) -> Result<(), ApiError> {
        let req = self
            .client
            .put(self.url(&format!("/words/{id}")))
            .bearer_auth(&session.token)
            .multipart(draft_form(draft, image)?);
        super::check(req.send().await?).await?;
        Ok(())
    }

    pub async fn delete_word(&self, id: &str, session: &AuthSession) -> Result<(), ApiError> {
        let req = self
            .client
            .delete(self.url(&format!("/words/{id}")))
            .bearer_auth(&session.token);
        super::check(req.send().await?).await?;
        Ok(())
    }

    /// Admin listing of duplicate entry groups.
    pub async fn duplicate_words(
        &self,
        page: u32,
        limit: u32,
        query: &str,
        session: &AuthSession,
    ) -> Result<DuplicatePage, ApiError> {
        let req = self
            .client
            .get(self.url("/admin/words/duplicates"))
            .bearer_auth(&session.token)
            .query(&[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("q", query.to_string()),
            ]);
        let response = super::check(req.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Marks an entry as ignored (or not) in duplicate reports.
    pub async fn set_word_ignore(
        &self,
        word_id: &str,
        ignore: bool,
        session: &AuthSession,
    ) -> Result<(), ApiError> {
        let req = self
            .client
            .put(self.url("/admin/words/ignore"))
            .bearer_auth(&session.token)
            .json(&json!({ "wordId": word_id, "ignore": ignore }));
        super::check(req.send().await?).await?;
        Ok(())
    }

    /// Bulk-imports entries from a spreadsheet, sent base64-encoded in a JSON
    /// body. Uses the long-timeout client.
    pub async fn upload_words_workbook(
        &self,
        upload: &WorkbookUpload,
        session: &AuthSession,
    ) -> Result<UploadReply, ApiError> {
        let req = self
            .upload_client
            .post(self.url("/words/excel-upload-base64"))
            .bearer_auth(&session.token)
            .json(&json!({
                "fileName": upload.file_name,
                "fileData": upload.file_data,
                "fileType": upload.file_type,
            }));
        let response = super::check(req.send().await?).await?;
        Ok(response.json().await?)
    }
}

fn draft_form(draft: &EntryDraft, image: Option<ImageFile>) -> Result<Form, ApiError> {
    let mut form = Form::new().text("english", draft.english.clone());
    if let Some(japanese) = &draft.japanese {
        form = form.text("japanese", japanese.clone());
    }
    if let Some(myanmar) = &draft.myanmar {
        form = form.text("myanmar", myanmar.clone());
    }
    if let Some(sub_term) = &draft.sub_term {
        form = form.text("subTerm", sub_term.clone());
    }
    if let Some(image) = image {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime)?;
        form = form.part("image", part);
    }
    Ok(form)
}

/// Production [`SearchBackend`] over the paginated listing endpoint.
pub struct ApiSearchBackend {
    api: Arc<ApiClient>,
    session: Option<AuthSession>,
    page_limit: u32,
}

impl ApiSearchBackend {
    pub fn new(api: Arc<ApiClient>, session: Option<AuthSession>, page_limit: u32) -> Self {
        Self {
            api,
            session,
            page_limit,
        }
    }
}

#[async_trait]
impl SearchBackend for ApiSearchBackend {
    async fn fetch_page(&self, query: &str, page: u32) -> Result<ResultPage, ApiError> {
        self.api
            .list_words(page, self.page_limit, query, self.session.as_ref())
            .await
    }
}
