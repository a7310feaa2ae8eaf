// Lock cloud access-code endpoints
//
// List, create, update and delete keypad codes. The cloud calls them
// "partages accessoire" (accessory shares).

use tracing::debug;

use crate::error::Error;
use crate::lock::client::LockClient;
use crate::lock::models::{CodeForm, CodeListing, CreatedCode, RemoteCode};

impl LockClient {
    /// List every keypad code registered on a lock.
    ///
    /// `GET /fr/api/v2/partage/all/serrure/{lock_id}?_format=json`
    pub async fn list_codes(&self, lock_id: u64) -> Result<Vec<RemoteCode>, Error> {
        let url = self.url(&format!(
            "fr/api/v2/partage/all/serrure/{lock_id}?_format=json"
        ))?;
        debug!(lock_id, "listing codes");
        let listing: CodeListing = self.get(url).await?;
        Ok(listing.partages_accessoire)
    }

    /// Create a keypad code on a lock's keypad accessory.
    ///
    /// `POST /fr/api/v2/partage/create/{lock_id}/accessoire/{accessoire_id}`
    pub async fn create_code(
        &self,
        lock_id: u64,
        accessoire_id: &str,
        form: &CodeForm,
    ) -> Result<CreatedCode, Error> {
        let url = self.url(&format!(
            "fr/api/v2/partage/create/{lock_id}/accessoire/{accessoire_id}"
        ))?;
        debug!(lock_id, accessoire_id, name = %form.name, "creating code");
        let created: Option<CreatedCode> = self.post_form(url, &form.to_form()).await?;
        created.ok_or_else(|| Error::LockApi {
            status: 200,
            message: "create response carried no code".into(),
        })
    }

    /// Replace every mutable field of an existing code.
    ///
    /// `POST /fr/api/v2/partage/accessoire/update/{code_id}`
    pub async fn update_code(&self, code_id: u64, form: &CodeForm) -> Result<(), Error> {
        let url = self.url(&format!("fr/api/v2/partage/accessoire/update/{code_id}"))?;
        debug!(code_id, "updating code");
        let _: serde_json::Value = self.post_form(url, &form.to_form()).await?;
        Ok(())
    }

    /// Delete a code.
    ///
    /// `POST /fr/api/v2/partage/accessoire/delete/{code_id}`
    pub async fn delete_code(&self, code_id: u64) -> Result<(), Error> {
        let url = self.url(&format!("fr/api/v2/partage/accessoire/delete/{code_id}"))?;
        debug!(code_id, "deleting code");
        let _: serde_json::Value = self.post_empty(url).await?;
        Ok(())
    }
}
