use std::time::Duration;

use reqwest::Client;
use tracing::warn;

/// Decoded avatar, ready to be copied into a pixel buffer.
#[derive(Debug, Clone)]
pub struct AvatarPixels {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Downloads avatar image bytes and decodes them into raw RGBA pixels.
/// A missing avatar is not worth failing the search over, so errors are
/// logged and turned into `None`. The whole download is bounded by `timeout`.
pub async fn download_avatar_pixels(
    client: &Client,
    url: &str,
    size: u32,
    timeout: Duration,
) -> Option<AvatarPixels> {
    let sized_url = sized_avatar_url(url, size);

    let bytes = match fetch_bytes(client, &sized_url, timeout).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to download avatar {sized_url}: {e}");
            return None;
        }
    };

    match decode_avatar(&bytes, size) {
        Ok(pixels) => Some(pixels),
        Err(e) => {
            warn!("Failed to decode avatar {sized_url}: {e}");
            None
        }
    }
}

async fn fetch_bytes(client: &Client, url: &str, timeout: Duration) -> reqwest::Result<Vec<u8>> {
    let bytes = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(bytes.to_vec())
}

fn sized_avatar_url(url: &str, size: u32) -> String {
    if url.contains('?') {
        format!("{url}&s={size}")
    } else {
        format!("{url}?s={size}")
    }
}

/// GitHub sometimes ignores `s=` for cached avatars, so the image is
/// scaled down to `size` regardless.
fn decode_avatar(bytes: &[u8], size: u32) -> image::ImageResult<AvatarPixels> {
    let rgba = image::load_from_memory(bytes)?
        .thumbnail_exact(size, size)
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(AvatarPixels {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn appends_size_parameter() {
        assert_eq!(
            sized_avatar_url("https://avatars.githubusercontent.com/u/583231?v=4", 120),
            "https://avatars.githubusercontent.com/u/583231?v=4&s=120"
        );
        assert_eq!(
            sized_avatar_url("https://avatars.githubusercontent.com/u/583231", 64),
            "https://avatars.githubusercontent.com/u/583231?s=64"
        );
    }

    #[test]
    fn decodes_and_scales_png() {
        let source = RgbaImage::from_pixel(200, 200, Rgba([10, 20, 30, 255]));
        let mut png = Cursor::new(Vec::new());
        source.write_to(&mut png, ImageFormat::Png).unwrap();

        let pixels = decode_avatar(png.get_ref(), 50).unwrap();

        assert_eq!((pixels.width, pixels.height), (50, 50));
        assert_eq!(pixels.rgba.len(), 50 * 50 * 4);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_avatar(b"definitely not an image", 50).is_err());
    }

    #[tokio::test]
    async fn silent_host_gives_up_after_the_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection and never answer.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let client = Client::new();
        let url = format!("http://{addr}/u/583231");
        let pixels = tokio::time::timeout(
            Duration::from_secs(5),
            download_avatar_pixels(&client, &url, 50, Duration::from_millis(200)),
        )
        .await
        .expect("download should stop at its own timeout");

        assert!(pixels.is_none());
        server.abort();
    }
}
