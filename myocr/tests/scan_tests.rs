mod common;

use std::io::Write;

use pretty_assertions::assert_eq;

use common::{fixture_dir, init_test_logger, write_test_png, Reply, StubRecognizer};
use myocr::args::parse_args;
use myocr::config::{Config, OcrConfig, ScanConfig};
use myocr::error::OcrError;
use myocr::ocr::Accuracy;
use myocr::pipeline::run_scan;
use myocr::vocabulary::Vocabulary;

fn test_config() -> Config {
    Config {
        scan: ScanConfig::default(),
        ocr: OcrConfig::default(),
    }
}

async fn scan(args: &[&str], engine: &StubRecognizer) -> (Result<(), OcrError>, String) {
    init_test_logger();
    let args = parse_args(args).expect("arguments should parse");
    let mut out = Vec::new();
    let result = run_scan(&args, &test_config(), engine, &mut out).await;
    (result, String::from_utf8(out).expect("output is UTF-8"))
}

#[tokio::test]
async fn test_cropy_and_footer_resolve_single_region() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 800, 1000);
    let engine = StubRecognizer::new(vec![Reply::Lines(vec!["Total", "42.00"])]);

    let (result, output) = scan(
        &[photo.to_str().unwrap(), "-cropy:100", "-footer:20"],
        &engine,
    )
    .await;

    result.unwrap();
    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!((calls[0].width, calls[0].height), (800, 832));
    assert_eq!(output, "Total\n42.00\n");
}

#[tokio::test]
async fn test_two_insets_join_with_space() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 800, 1000);
    let engine = StubRecognizer::new(vec![
        Reply::Lines(vec!["hello"]),
        Reply::Lines(vec!["world"]),
    ]);

    let (result, output) = scan(
        &[photo.to_str().unwrap(), "-insets:0,0,0,0:10,10,10,10"],
        &engine,
    )
    .await;

    result.unwrap();
    let sizes: Vec<(u32, u32)> = engine.calls().iter().map(|c| (c.width, c.height)).collect();
    assert_eq!(sizes, vec![(800, 952), (780, 932)]);
    assert_eq!(output, "hello world\n");
}

#[tokio::test]
async fn test_default_region_excludes_navbar_bands() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 400, 300);
    let engine = StubRecognizer::new(vec![Reply::Lines(vec!["menu"])]);

    let (result, output) = scan(&[photo.to_str().unwrap()], &engine).await;

    result.unwrap();
    let calls = engine.calls();
    assert_eq!((calls[0].width, calls[0].height), (400, 204));
    assert_eq!(output, "menu\n");
}

#[tokio::test]
async fn test_crops_come_from_gamma_adjusted_image() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 200, 200);
    let engine = StubRecognizer::new(vec![]);

    let (result, _) = scan(&[photo.to_str().unwrap()], &engine).await;

    result.unwrap();
    // 64 raised to the 0.5 power in normalized space.
    assert_eq!(engine.calls()[0].first_red, 128);
}

#[tokio::test]
async fn test_failed_region_leaves_gap_but_keeps_others() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 600, 600);
    let engine = StubRecognizer::new(vec![
        Reply::Lines(vec!["left"]),
        Reply::Fail("engine crashed"),
        Reply::Lines(vec!["right"]),
    ]);

    let (result, output) = scan(
        &[
            photo.to_str().unwrap(),
            "-insets:0,0,0,400:0,200,0,200:0,400,0,0",
        ],
        &engine,
    )
    .await;

    result.unwrap();
    assert_eq!(engine.calls().len(), 3);
    assert_eq!(output, "left  right\n");
}

#[tokio::test]
async fn test_single_inset_region_prints_its_text() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 300, 300);
    let engine = StubRecognizer::new(vec![Reply::Lines(vec!["only"])]);

    let (result, output) = scan(&[photo.to_str().unwrap(), "-insets:10,10,10,10"], &engine).await;

    result.unwrap();
    assert_eq!(output, "only\n");
}

#[tokio::test]
async fn test_no_text_detected_prints_empty_line() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 300, 300);
    let engine = StubRecognizer::new(vec![Reply::Lines(vec![])]);

    let (result, output) = scan(&[photo.to_str().unwrap()], &engine).await;

    result.unwrap();
    assert_eq!(output, "\n");
}

#[tokio::test]
async fn test_missing_image_is_load_error() {
    let dir = fixture_dir();
    let missing = dir.path().join("nope.png");
    let engine = StubRecognizer::new(vec![]);

    let (result, output) = scan(&[missing.to_str().unwrap()], &engine).await;

    assert!(matches!(result, Err(OcrError::Load { .. })));
    assert!(engine.calls().is_empty());
    assert_eq!(output, "");
}

#[tokio::test]
async fn test_region_beyond_image_is_crop_error() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 100, 100);
    let engine = StubRecognizer::new(vec![]);

    let (result, output) = scan(&[photo.to_str().unwrap(), "-cropy:80"], &engine).await;

    assert!(matches!(result, Err(OcrError::Crop(_))));
    assert!(engine.calls().is_empty());
    assert_eq!(output, "");
}

#[tokio::test]
async fn test_wordlist_and_profile_reach_engine() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 300, 300);
    let words = dir.path().join("words.txt");
    std::fs::File::create(&words)
        .and_then(|mut f| f.write_all(b"apple - a fruit\nbanana\n"))
        .unwrap();
    let engine = StubRecognizer::new(vec![]);
    let words_arg = format!("-words:{}", words.display());

    let (result, _) = scan(
        &[
            photo.to_str().unwrap(),
            words_arg.as_str(),
            "-min:0.1",
            "-fast",
        ],
        &engine,
    )
    .await;

    result.unwrap();
    let config = &engine.calls()[0].config;
    assert_eq!(config.vocabulary, Vocabulary::from_wordlist("apple\nbanana"));
    assert_eq!(config.min_text_height, 0.1);
    assert_eq!(config.accuracy, Accuracy::Fast);
}

#[tokio::test]
async fn test_unreadable_wordlist_uses_default_vocabulary() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 300, 300);
    let engine = StubRecognizer::new(vec![]);

    let (result, _) = scan(
        &[photo.to_str().unwrap(), "-words:/definitely/not/here.txt"],
        &engine,
    )
    .await;

    result.unwrap();
    assert_eq!(engine.calls()[0].config.vocabulary, Vocabulary::default());
}

#[tokio::test]
async fn test_debug_prints_vocabulary_and_rectangles() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 800, 1000);
    let words = dir.path().join("words.txt");
    std::fs::write(&words, "zeta\nalpha - first\n").unwrap();
    let engine = StubRecognizer::new(vec![Reply::Lines(vec!["text"])]);
    let words_arg = format!("-words:{}", words.display());

    let (result, output) = scan(
        &[
            "-d",
            words_arg.as_str(),
            photo.to_str().unwrap(),
            "-cropy:100",
            "-footer:20",
        ],
        &engine,
    )
    .await;

    result.unwrap();
    assert_eq!(
        output,
        "[\"alpha\", \"zeta\"]\n=(x: 0, y: 100, width: 800, height: 832)\ntext\n"
    );
}

#[tokio::test]
async fn test_dump_writes_preprocessed_image() {
    let dir = fixture_dir();
    let photo = write_test_png(dir.path(), "photo.png", 120, 200);
    let dump = dir.path().join("dump.png");
    let engine = StubRecognizer::new(vec![]);
    let dump_arg = format!("-dump:{}", dump.display());

    let (result, _) = scan(&[photo.to_str().unwrap(), dump_arg.as_str()], &engine).await;

    result.unwrap();
    let dumped = image::open(&dump).unwrap().to_rgba8();
    assert_eq!(dumped.dimensions(), (120, 200));
    assert_eq!(dumped.get_pixel(0, 0)[0], 128);
}
