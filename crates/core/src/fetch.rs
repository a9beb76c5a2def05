use crate::assets::{load_bytes, ModelSource};
use crate::error::LoadError;
use crate::progress::{LoadProgress, ProgressSink};

#[cfg(not(target_arch = "wasm32"))]
const READ_CHUNK: usize = 64 * 1024;

/// Blocking read of a model source. Meant for a worker thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn fetch_bytes_blocking(
    source: &ModelSource,
    progress: Option<ProgressSink>,
) -> Result<Vec<u8>, LoadError> {
    match source {
        ModelSource::Blob(key) => load_bytes(key).ok_or_else(|| LoadError::MissingBlob(key.clone())),
        ModelSource::Path(path) => std::fs::read(path).map_err(|err| LoadError::Fetch {
            source: path.display().to_string(),
            message: err.to_string(),
        }),
        ModelSource::Url(url) => fetch_url_blocking(url, progress),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_url_blocking(url: &str, progress: Option<ProgressSink>) -> Result<Vec<u8>, LoadError> {
    use std::io::Read;

    let fetch_error = |message: String| LoadError::Fetch {
        source: url.to_string(),
        message,
    };
    let response = ureq::get(url)
        .call()
        .map_err(|err| fetch_error(err.to_string()))?;
    let total = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok());
    let mut reader = response.into_reader();
    let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let read = reader
            .read(&mut chunk)
            .map_err(|err| fetch_error(err.to_string()))?;
        if read == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..read]);
        if let Some(sink) = &progress {
            sink(LoadProgress {
                loaded: data.len() as u64,
                total,
            });
        }
    }
    Ok(data)
}

#[cfg(target_arch = "wasm32")]
pub async fn fetch_bytes(
    source: &ModelSource,
    progress: Option<ProgressSink>,
) -> Result<Vec<u8>, LoadError> {
    match source {
        ModelSource::Blob(key) => load_bytes(key).ok_or_else(|| LoadError::MissingBlob(key.clone())),
        ModelSource::Path(path) => Err(LoadError::Unsupported(format!(
            "file paths are not readable in web builds: {}",
            path.display()
        ))),
        ModelSource::Url(url) => fetch_url(url, progress).await,
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_url(url: &str, progress: Option<ProgressSink>) -> Result<Vec<u8>, LoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |message: String| LoadError::Fetch {
        source: url.to_string(),
        message,
    };
    let window = web_sys::window().ok_or_else(|| fetch_error("no window".to_string()))?;
    let init = web_sys::RequestInit::new();
    init.set_method("GET");
    init.set_mode(web_sys::RequestMode::Cors);
    let request = web_sys::Request::new_with_str_and_init(url, &init)
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| fetch_error("fetch did not return a Response".to_string()))?;
    if !response.ok() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }
    let buffer = response
        .array_buffer()
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    let data = js_sys::Uint8Array::new(&buffer).to_vec();
    if let Some(sink) = &progress {
        sink(LoadProgress {
            loaded: data.len() as u64,
            total: Some(data.len() as u64),
        });
    }
    Ok(data)
}
