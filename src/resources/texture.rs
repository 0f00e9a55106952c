use std::path::Path;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page has no origin"))?;
    let base = reqwest::Url::parse(&format!("{}/", origin))?;
    Ok(base.join(file_name.trim_start_matches('/'))?)
}

/// Reads an asset. Paths are relative to `root` on native builds and to the
/// page origin on the web; a leading `/` is ignored.
pub async fn load_binary(root: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let _ = root;
        let url = format_url(file_name)?;
        reqwest::get(url).await?.error_for_status()?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = root.join(file_name.trim_start_matches('/'));
        // TODO: switch to tokio::fs once loads run on the tokio runtime instead of the frame-polled pool
        std::fs::read(&path)
            .map_err(|e| anyhow::anyhow!("could not read {}: {}", path.display(), e))?
    };

    Ok(data)
}

pub async fn load_string(root: &Path, file_name: &str) -> anyhow::Result<String> {
    let bytes = load_binary(root, file_name).await?;
    Ok(String::from_utf8(bytes)?)
}

/// Decodes image bytes, using the file extension as a format hint when it has one.
pub fn decode_image(bytes: &[u8], file_name: &str) -> anyhow::Result<image::RgbaImage> {
    let format = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(image::ImageFormat::from_extension);
    let img = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format)?,
        None => image::load_from_memory(bytes)?,
    };
    Ok(img.to_rgba8())
}

pub async fn load_image(root: &Path, file_name: &str) -> anyhow::Result<image::RgbaImage> {
    let data = load_binary(root, file_name).await?;
    decode_image(&data, file_name)
}

/// Joins `uri` onto the directory of `base`, the way model files reference
/// their buffers and images.
pub fn sibling_path(base: &str, uri: &str) -> String {
    match base.rfind('/') {
        Some(idx) => format!("{}/{}", &base[..idx], uri),
        None => uri.to_string(),
    }
}
