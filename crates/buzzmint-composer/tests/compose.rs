//! End-to-end compose tests: determinism, photo fetching, and fallbacks.

use std::collections::HashSet;
use std::io::Cursor;

use buzzmint_composer::{Composer, MemeSpec, MemeStyle};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_MAGIC: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

fn composer() -> Composer {
    Composer::new(5, "buzzmint-tests/0.1").unwrap()
}

fn tiny_png(color: [u8; 3]) -> Vec<u8> {
    let photo = RgbImage::from_pixel(24, 24, Rgb(color));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(photo)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn base_builder() -> buzzmint_composer::MemeSpecBuilder {
    MemeSpec::builder("corner deli", "2 FOR 1")
        .keywords(vec!["mahomes".to_string(), "kelce".to_string()])
        .size(256, 256)
}

#[tokio::test]
async fn compose_is_deterministic_without_randomize() {
    let spec = base_builder().style(MemeStyle::Classic).build().unwrap();
    let composer = composer();

    let first = composer.compose(&spec).await.unwrap();
    let second = composer.compose(&spec).await.unwrap();

    assert_eq!(first.variant, 0);
    assert_eq!(first.bytes, second.bytes, "same spec must render identical bytes");
}

#[tokio::test]
async fn same_seed_reproduces_randomized_composition() {
    let spec = base_builder()
        .style(MemeStyle::Classic)
        .randomize(true)
        .seed(Some(42))
        .build()
        .unwrap();
    let composer = composer();

    let first = composer.compose(&spec).await.unwrap();
    let second = composer.compose(&spec).await.unwrap();

    assert_eq!(first.variant, second.variant);
    assert_eq!(first.bytes, second.bytes, "seeded renders must be reproducible");
}

#[tokio::test]
async fn seeds_vary_the_chosen_variant() {
    let composer = composer();
    let mut variants = HashSet::new();
    for seed in 0..12 {
        let spec = base_builder()
            .style(MemeStyle::Classic)
            .randomize(true)
            .seed(Some(seed))
            .build()
            .unwrap();
        variants.insert(composer.compose(&spec).await.unwrap().variant);
    }
    assert!(variants.len() > 1, "twelve seeds never changed the layout");
}

#[tokio::test]
async fn minimal_spec_renders_valid_png() {
    let spec = MemeSpec::builder("corner deli", "2 FOR 1")
        .size(256, 256)
        .build()
        .unwrap();
    let image = composer().compose(&spec).await.unwrap();

    assert_eq!(&image.bytes[..8], PNG_MAGIC);
    assert_eq!((image.width, image.height), (256, 256));
    let decoded = image::load_from_memory(&image.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (256, 256));
}

#[tokio::test]
async fn failed_background_fetch_falls_back_to_gradient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bg.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let spec = base_builder()
        .style(MemeStyle::Classic)
        .background_url(Some(format!("{}/bg.png", server.uri())))
        .build()
        .unwrap();
    let image = composer().compose(&spec).await.unwrap();
    assert_eq!(&image.bytes[..8], PNG_MAGIC);
}

#[tokio::test]
async fn fetched_photo_is_composed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bg.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(tiny_png([200, 100, 50]), "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let spec = base_builder()
        .style(MemeStyle::Classic)
        .background_url(Some(format!("{}/bg.png", server.uri())))
        .build()
        .unwrap();
    let image = composer().compose(&spec).await.unwrap();
    assert_eq!((image.width, image.height), (256, 256));
}

#[tokio::test]
async fn undecodable_body_is_skipped_for_the_next_candidate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/good.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(tiny_png([40, 160, 90]), "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let spec = base_builder()
        .style(MemeStyle::Classic)
        .gallery(vec![
            format!("{}/broken.png", server.uri()),
            format!("{}/good.png", server.uri()),
        ])
        .build()
        .unwrap();
    let image = composer().compose(&spec).await.unwrap();
    assert_eq!(&image.bytes[..8], PNG_MAGIC);
}

#[tokio::test]
async fn grid_fetches_one_photo_per_tile() {
    let server = MockServer::start().await;
    for name in ["a", "b", "c", "d"] {
        Mock::given(method("GET"))
            .and(path(format!("/{name}.png")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(tiny_png([90, 90, 200]), "image/png"),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let gallery = ["a", "b", "c", "d"]
        .iter()
        .map(|name| format!("{}/{name}.png", server.uri()))
        .collect();
    let spec = base_builder()
        .style(MemeStyle::Grid { tiles: 4 })
        .gallery(gallery)
        .build()
        .unwrap();
    let image = composer().compose(&spec).await.unwrap();
    assert_eq!(&image.bytes[..8], PNG_MAGIC);
}

#[tokio::test]
async fn grid_without_photos_still_renders() {
    let spec = base_builder()
        .style(MemeStyle::Grid { tiles: 2 })
        .build()
        .unwrap();
    let image = composer().compose(&spec).await.unwrap();
    assert_eq!(&image.bytes[..8], PNG_MAGIC);
}

#[tokio::test]
async fn card_style_renders_offer_banner() {
    let spec = base_builder().style(MemeStyle::Card).build().unwrap();
    let image = composer().compose(&spec).await.unwrap();

    let decoded = image::load_from_memory(&image.bytes).unwrap().to_rgb8();
    let banner_pixels = decoded
        .pixels()
        .filter(|p| p.0 == [255, 213, 79])
        .count();
    assert!(banner_pixels > 0, "offer banner missing from card render");
}

#[tokio::test]
async fn classic_headline_stays_readable_over_dark_gradient() {
    let spec = base_builder().style(MemeStyle::Classic).build().unwrap();
    let image = composer().compose(&spec).await.unwrap();

    let decoded = image::load_from_memory(&image.bytes).unwrap().to_rgb8();
    let top_quarter = decoded.height() / 4;
    let light_pixels = decoded
        .enumerate_pixels()
        .filter(|(_, y, p)| *y < top_quarter && p.0 == [245, 245, 245])
        .count();
    assert!(light_pixels > 0, "expected light headline text over the dark plate");
}

#[tokio::test]
async fn data_url_embeds_the_png() {
    let spec = base_builder().build().unwrap();
    let image = composer().compose(&spec).await.unwrap();
    let url = image.to_data_url();
    assert!(url.starts_with("data:image/png;base64,"));
    assert!(url.len() > image.bytes.len());
}
