// file: src/client/files.rs
// description: file upload, download and metadata
// reference: https://api.mattermost.com/#tag/files

use super::http::MattermostClient;
use crate::error::{MattermostError, Result};
use crate::models::{DownloadedFile, FileInfo, FileUploadResponse};
use crate::utils::Validator;
use futures::{Stream, StreamExt};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::pin::pin;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

#[derive(Deserialize)]
struct FileLink {
    #[serde(default)]
    link: String,
}

impl MattermostClient {
    /// Uploads a local file to a channel; attach the returned ids to a post.
    pub async fn upload_file(
        &self,
        channel_id: &str,
        file_path: &Path,
        filename: Option<&str>,
    ) -> Result<FileUploadResponse> {
        Validator::validate_id("channel_id", channel_id)?;
        Validator::validate_file_path(file_path).await?;

        let filename = match filename.filter(|f| !f.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    MattermostError::Validation(format!(
                        "Cannot derive a filename from {}",
                        file_path.display()
                    ))
                })?,
        };

        let data = fs::read(file_path)
            .await
            .map_err(|e| MattermostError::io(file_path, e))?;
        let size = data.len();

        let part = Part::bytes(data)
            .file_name(filename.clone())
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .text("channel_id", channel_id.to_string())
            .part("files", part);

        let request = self.request(Method::POST, "files")?.multipart(form);
        let response = self.send_once(request).await?;
        let uploaded: FileUploadResponse = response.json().await?;

        info!(
            "Uploaded {} ({} bytes) to channel {}",
            filename, size, channel_id
        );
        Ok(uploaded)
    }

    pub async fn get_file_info(&self, file_id: &str) -> Result<FileInfo> {
        Validator::validate_id("file_id", file_id)?;
        self.get_json(&format!("files/{}/info", file_id)).await
    }

    /// Streams a file to `save_path`, creating parent directories.
    pub async fn download_file(&self, file_id: &str, save_path: &Path) -> Result<DownloadedFile> {
        Validator::validate_id("file_id", file_id)?;
        if save_path.file_name().is_none() {
            return Err(MattermostError::Validation(format!(
                "save_path must name a file: {}",
                save_path.display()
            )));
        }

        let response = self
            .execute(Method::GET, &format!("files/{}", file_id), &[], None)
            .await?;

        if let Some(parent) = save_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| MattermostError::io(parent, e))?;
        }

        let bytes = save_stream(response.bytes_stream(), save_path).await?;
        info!("Downloaded file {} to {} ({} bytes)", file_id, save_path.display(), bytes);

        Ok(DownloadedFile {
            file_id: file_id.to_string(),
            saved_to: save_path.to_path_buf(),
            bytes,
        })
    }

    /// Public link for a file; empty when public links are disabled.
    pub async fn get_file_link(&self, file_id: &str) -> Result<String> {
        Validator::validate_id("file_id", file_id)?;
        let link: FileLink = self.get_json(&format!("files/{}/link", file_id)).await?;
        Ok(link.link)
    }
}

/// `report.pdf` -> `report.pdf.part` in the same directory.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Writes `stream` next to `save_path` and renames it into place once complete.
/// A failed transfer removes the partial file and leaves `save_path` untouched.
async fn save_stream<S, B, E>(stream: S, save_path: &Path) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    MattermostError: From<E>,
{
    let partial = partial_path(save_path);

    let bytes = match write_stream(stream, &partial).await {
        Ok(bytes) => bytes,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e);
        }
    };

    fs::rename(&partial, save_path)
        .await
        .map_err(|e| MattermostError::io(save_path, e))?;
    Ok(bytes)
}

async fn write_stream<S, B, E>(stream: S, path: &Path) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    MattermostError: From<E>,
{
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| MattermostError::io(path, e))?;

    let mut bytes: u64 = 0;
    let mut stream = pin!(stream);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        file.write_all(chunk)
            .await
            .map_err(|e| MattermostError::io(path, e))?;
        bytes += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| MattermostError::io(path, e))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::http::tests::{CHANNEL_ID, FILE_ID, test_client};
    use mockito::Matcher;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_file_sends_multipart() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.txt");
        std::fs::write(&path, "quarterly numbers").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v4/files")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"channel_id\"".to_string()),
                Matcher::Regex(CHANNEL_ID.to_string()),
                Matcher::Regex("filename=\"custom.txt\"".to_string()),
                Matcher::Regex("quarterly numbers".to_string()),
            ]))
            .with_status(201)
            .with_body(
                json!({
                    "file_infos": [{"id": FILE_ID, "name": "custom.txt", "size": 17}],
                    "client_ids": []
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = test_client(&server);
        let uploaded = client
            .upload_file(CHANNEL_ID, &path, Some("custom.txt"))
            .await
            .unwrap();

        assert_eq!(uploaded.file_infos[0].id, FILE_ID);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_missing_file_rejected() {
        let server = mockito::Server::new_async().await;
        let client = test_client(&server);
        let result = client
            .upload_file(CHANNEL_ID, Path::new("/nonexistent/file.bin"), None)
            .await;
        assert!(matches!(result, Err(MattermostError::Validation(_))));
    }

    #[tokio::test]
    async fn test_download_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested/dir/out.bin");

        let mut server = mockito::Server::new_async().await;
        let file_path = format!("/api/v4/files/{}", FILE_ID);
        let mock = server
            .mock("GET", file_path.as_str())
            .with_status(200)
            .with_body(vec![1u8, 2, 3, 4, 5])
            .create_async()
            .await;

        let client = test_client(&server);
        let downloaded = client.download_file(FILE_ID, &target).await.unwrap();

        assert_eq!(downloaded.bytes, 5);
        assert_eq!(std::fs::read(&target).unwrap(), vec![1, 2, 3, 4, 5]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_attempted_once_on_server_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.txt");
        std::fs::write(&path, "quarterly numbers").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v4/files")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server);
        let err = client.upload_file(CHANNEL_ID, &path, None).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        mock.assert_async().await;
    }

    #[test]
    fn test_partial_path_is_a_sibling() {
        assert_eq!(
            partial_path(Path::new("/tmp/out/report.pdf")),
            PathBuf::from("/tmp/out/report.pdf.part")
        );
    }

    #[tokio::test]
    async fn test_interrupted_stream_keeps_existing_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out.bin");
        std::fs::write(&target, "previous contents").unwrap();

        let chunks = futures::stream::iter(vec![
            Ok(b"half of the".to_vec()),
            Err(MattermostError::Validation("connection reset".to_string())),
        ]);
        let result = save_stream(chunks, &target).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous contents");
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn test_completed_stream_replaces_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out.bin");
        std::fs::write(&target, "previous contents").unwrap();

        let chunks = futures::stream::iter(vec![
            Ok::<_, MattermostError>(b"new ".to_vec()),
            Ok(b"contents".to_vec()),
        ]);
        let bytes = save_stream(chunks, &target).await.unwrap();

        assert_eq!(bytes, 12);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new contents");
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn test_file_info_and_link() {
        let mut server = mockito::Server::new_async().await;
        let info_path = format!("/api/v4/files/{}/info", FILE_ID);
        let info = server
            .mock("GET", info_path.as_str())
            .with_status(200)
            .with_body(json!({"id": FILE_ID, "name": "a.png", "mime_type": "image/png"}).to_string())
            .create_async()
            .await;
        let link_path = format!("/api/v4/files/{}/link", FILE_ID);
        let link = server
            .mock("GET", link_path.as_str())
            .with_status(200)
            .with_body(r#"{"link":"https://chat.example.com/files/abc/public"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        assert_eq!(client.get_file_info(FILE_ID).await.unwrap().mime_type, "image/png");
        assert_eq!(
            client.get_file_link(FILE_ID).await.unwrap(),
            "https://chat.example.com/files/abc/public"
        );

        info.assert_async().await;
        link.assert_async().await;
    }
}
