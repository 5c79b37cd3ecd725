//! reqwest-backed repository talking to the lines backend over JSON.

use atomo_api_types::{
    CreatedLine, EtaEntry, EtaTable, Line, LineIdentifier, NewLine, OcrImport,
    ScheduleReplacement, Stop, StopIndex, StopPatch, StopPatchRequest,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::repository::{ImageUpload, LineRepository, RepositoryFuture};

/// Multipart field the recognition endpoint reads the photo from.
const IMAGE_FIELD: &str = "image";

#[derive(Clone, Debug)]
pub struct HttpLineRepository {
    client: Client,
    base: Url,
}

/// Method and path of a request, kept for error reporting.
struct Endpoint {
    method: &'static str,
    path: String,
}

impl Endpoint {
    fn transport(&self, source: reqwest::Error) -> EditorError {
        EditorError::Transport {
            method: self.method,
            path: self.path.clone(),
            source,
        }
    }
}

impl HttpLineRepository {
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    pub fn from_config(config: &EditorConfig) -> Result<Self> {
        Ok(Self::new(config.backend_url()?))
    }

    /// Join path segments onto the base URL. Segments are percent-encoded, so
    /// opaque identifiers cannot escape their path position.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn line_url(&self, line: &LineIdentifier, rest: &str) -> Url {
        self.url(&["api", "lines", line.as_str(), rest])
    }

    fn endpoint(method: &'static str, url: &Url) -> Endpoint {
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        Endpoint { method, path }
    }

    async fn send(&self, endpoint: &Endpoint, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(method = endpoint.method, path = %endpoint.path, "backend request");

        let response = request.send().await.map_err(|e| endpoint.transport(e))?;
        let status = response.status();

        if !status.is_success() {
            tracing::debug!(method = endpoint.method, path = %endpoint.path, %status, "backend rejected request");
            return Err(EditorError::Status {
                method: endpoint.method,
                path: endpoint.path.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<T> {
        let response = self.send(&endpoint, request).await?;
        response.json::<T>().await.map_err(|e| endpoint.transport(e))
    }

    /// Send a mutation whose response body carries nothing the editor uses.
    async fn send_ack(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<()> {
        let response = self.send(&endpoint, request).await?;
        response.bytes().await.map_err(|e| endpoint.transport(e))?;
        Ok(())
    }
}

impl LineRepository for HttpLineRepository {
    fn list_lines(&self) -> RepositoryFuture<'_, Vec<Line>> {
        Box::pin(async move {
            let url = self.url(&["api", "lines"]);
            let endpoint = Self::endpoint("GET", &url);
            self.send_json(endpoint, self.client.get(url)).await
        })
    }

    fn create_line<'a>(&'a self, line: &'a NewLine) -> RepositoryFuture<'a, LineIdentifier> {
        Box::pin(async move {
            let url = self.url(&["api", "lines"]);
            let endpoint = Self::endpoint("POST", &url);
            let created: CreatedLine = self
                .send_json(endpoint, self.client.post(url).json(line))
                .await?;
            Ok(created.id)
        })
    }

    fn append_stop<'a>(&'a self, line: &'a LineIdentifier, stop: &'a Stop) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let url = self.line_url(line, "stops");
            let endpoint = Self::endpoint("POST", &url);
            self.send_ack(endpoint, self.client.post(url).json(stop)).await
        })
    }

    fn patch_stop<'a>(
        &'a self,
        line: &'a LineIdentifier,
        index: usize,
        patch: &'a StopPatch,
    ) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let url = self.line_url(line, "stops");
            let endpoint = Self::endpoint("PATCH", &url);
            let body = StopPatchRequest {
                index,
                patch: patch.clone(),
            };
            self.send_ack(endpoint, self.client.patch(url).json(&body)).await
        })
    }

    fn delete_stop<'a>(&'a self, line: &'a LineIdentifier, index: usize) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let url = self.line_url(line, "stops");
            let endpoint = Self::endpoint("DELETE", &url);
            self.send_ack(endpoint, self.client.delete(url).json(&StopIndex { index }))
                .await
        })
    }

    fn replace_schedules<'a>(
        &'a self,
        line: &'a LineIdentifier,
        schedules: &'a [String],
    ) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let url = self.line_url(line, "schedules");
            let endpoint = Self::endpoint("PUT", &url);
            let body = ScheduleReplacement {
                schedules: schedules.to_vec(),
            };
            self.send_ack(endpoint, self.client.put(url).json(&body)).await
        })
    }

    fn recognize_timetable<'a>(&'a self, image: &'a ImageUpload) -> RepositoryFuture<'a, OcrImport> {
        Box::pin(async move {
            let url = self.url(&["api", "ocr", "upload"]);
            let endpoint = Self::endpoint("POST", &url);

            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| endpoint.transport(e))?;
            let form = Form::new().part(IMAGE_FIELD, part);

            self.send_json(endpoint, self.client.post(url).multipart(form)).await
        })
    }

    fn line_etas<'a>(
        &'a self,
        line: &'a LineIdentifier,
        from_stop_index: usize,
    ) -> RepositoryFuture<'a, Vec<EtaEntry>> {
        Box::pin(async move {
            let mut url = self.line_url(line, "eta");
            url.set_query(Some(&format!("from_stop_index={from_stop_index}")));
            let endpoint = Self::endpoint("GET", &url);

            let table: EtaTable = self.send_json(endpoint, self.client.get(url)).await?;
            Ok(table.etas)
        })
    }
}
