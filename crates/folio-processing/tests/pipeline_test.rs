mod helpers;

use folio_core::{MediaError, OverflowPolicy, PipelineConfig, UploadCandidate, VariantLabel};
use folio_storage::Storage;
use helpers::fixtures::{
    corrupt_jpeg, create_test_jpeg, create_test_png, create_test_webp,
};
use helpers::storage::FlakyStorage;
use helpers::{files_under, setup_test_pipeline, setup_test_pipeline_with, CATEGORY};
use image::GenericImageView;
use std::sync::Arc;

#[tokio::test]
async fn test_accepted_candidates_get_five_files_on_disk() {
    let test = setup_test_pipeline();
    let candidates = vec![
        test.stage("cover.jpg", "image/jpeg", &create_test_jpeg(800, 600)),
        test.stage("spine.png", "image/png", &create_test_png(300, 900)),
        test.stage("back.webp", "image/webp", &create_test_webp(400, 400)),
    ];

    let results = test
        .pipeline
        .process_uploads(CATEGORY, candidates)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    for result in &results {
        let item = result.as_ref().unwrap();
        let labels: Vec<VariantLabel> = item.derivatives.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, VariantLabel::ALL.to_vec());

        for (label, key) in item.derivatives.iter() {
            assert!(test.storage.exists(key).await.unwrap(), "{label} missing");
            assert_eq!(
                key,
                format!("{}/{}_{}.webp", CATEGORY, item.identifier, label)
            );
        }
    }

    // Only derivatives remain: stored originals were consumed.
    assert_eq!(test.stored_files().len(), 15);
}

#[tokio::test]
async fn test_unsupported_type_writes_nothing() {
    let test = setup_test_pipeline();
    let candidates = vec![
        test.stage("notes.pdf", "application/pdf", b"%PDF-1.7 not an image"),
        test.stage("anim.gif", "image/gif", b"GIF89a"),
    ];

    let results = test
        .pipeline
        .process_uploads(CATEGORY, candidates)
        .await
        .unwrap();

    match &results[0] {
        Err(MediaError::UnsupportedMediaType { media_type, .. }) => {
            assert_eq!(media_type, "application/pdf")
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert!(matches!(
        results[1],
        Err(MediaError::UnsupportedMediaType { .. })
    ));
    assert!(test.stored_files().is_empty());
}

#[tokio::test]
async fn test_six_candidates_rejected_up_front_by_default() {
    let test = setup_test_pipeline();
    let candidates: Vec<UploadCandidate> = (0..6)
        .map(|i| test.stage(&format!("p{i}.jpg"), "image/jpeg", &create_test_jpeg(32, 32)))
        .collect();

    let result = test.pipeline.process_uploads(CATEGORY, candidates).await;

    assert!(matches!(
        result,
        Err(MediaError::TooManyFiles { count: 6, max: 5 })
    ));
    assert!(test.stored_files().is_empty());
}

#[tokio::test]
async fn test_six_candidates_truncated_to_five() {
    let test = setup_test_pipeline_with(
        PipelineConfig {
            overflow_policy: OverflowPolicy::Truncate,
            ..PipelineConfig::default()
        },
        |local| Arc::new(local) as Arc<dyn Storage>,
    );
    let candidates: Vec<UploadCandidate> = (0..6)
        .map(|i| test.stage(&format!("p{i}.jpg"), "image/jpeg", &create_test_jpeg(32, 32)))
        .collect();
    let sixth_staging = match &candidates[5].source {
        folio_core::CandidateSource::Staged(path) => path.clone(),
        _ => unreachable!(),
    };

    let results = test
        .pipeline
        .process_uploads(CATEGORY, candidates)
        .await
        .unwrap();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 5);
    assert!(matches!(results[5], Err(MediaError::TooManyFiles { .. })));
    // The sixth never reached placement, let alone rendering.
    assert!(sixth_staging.exists());
    assert_eq!(test.stored_files().len(), 25);
}

#[tokio::test]
async fn test_small_source_is_never_upscaled() {
    let test = setup_test_pipeline();
    let results = test
        .pipeline
        .process_uploads(
            CATEGORY,
            vec![test.stage("tiny.png", "image/png", &create_test_png(120, 90))],
        )
        .await
        .unwrap();

    let item = results[0].as_ref().unwrap();
    for (label, key) in item.derivatives.iter() {
        let img = image::load_from_memory(&test.storage.read(key).await.unwrap()).unwrap();
        let (width, height) = img.dimensions();
        assert!(width <= 120 && height <= 90, "{label} is {width}x{height}");
    }

    let small = image::load_from_memory(
        &test.storage.read(&item.derivatives.small).await.unwrap(),
    )
    .unwrap();
    assert_eq!(small.dimensions(), (120, 90));

    let thumb = image::load_from_memory(
        &test.storage.read(&item.derivatives.thumbnail).await.unwrap(),
    )
    .unwrap();
    assert_eq!(thumb.dimensions(), (120, 90));
}

#[tokio::test]
async fn test_corrupt_candidate_is_isolated() {
    let test = setup_test_pipeline();
    let candidates = vec![
        test.stage("first.jpg", "image/jpeg", &create_test_jpeg(500, 400)),
        test.stage("broken.jpg", "image/jpeg", &corrupt_jpeg()),
        test.stage("third.png", "image/png", &create_test_png(400, 500)),
    ];

    let results = test
        .pipeline
        .process_uploads(CATEGORY, candidates)
        .await
        .unwrap();

    for index in [0, 2] {
        let item = results[index].as_ref().unwrap();
        for (_, key) in item.derivatives.iter() {
            assert!(test.storage.exists(key).await.unwrap());
        }
    }

    match &results[1] {
        Err(MediaError::ImageProcessingFailed { filename, .. }) => {
            assert_eq!(filename, "broken.jpg")
        }
        other => panic!("unexpected: {:?}", other),
    }

    // 10 derivatives plus the failed candidate's stored original.
    let files = test.stored_files();
    assert_eq!(files.len(), 11);
    let leftover: Vec<_> = files
        .iter()
        .filter(|p| {
            let name = p.file_name().unwrap().to_string_lossy();
            !VariantLabel::ALL
                .iter()
                .any(|label| name.contains(&format!("_{}.", label)))
        })
        .collect();
    assert_eq!(leftover.len(), 1);
    assert_eq!(std::fs::read(leftover[0]).unwrap(), corrupt_jpeg());
    assert_eq!(leftover[0].extension().unwrap(), "jpg");
}

#[tokio::test]
async fn test_end_to_end_notes_jpg() {
    let test = setup_test_pipeline();
    let candidate = test.stage("notes.jpg", "image/jpeg", &create_test_jpeg(2000, 3000));
    let staging_path = match &candidate.source {
        folio_core::CandidateSource::Staged(path) => path.clone(),
        _ => unreachable!(),
    };
    let uploaded_size = candidate.declared_size;

    let results = test
        .pipeline
        .process_uploads(CATEGORY, vec![candidate])
        .await
        .unwrap();

    let item = results[0].as_ref().unwrap();
    assert_eq!(item.original_filename, "notes.jpg");
    assert_eq!(item.size_bytes, uploaded_size);
    assert_eq!((item.width, item.height), (2000, 3000));

    let stem = format!("{}/{}_", CATEGORY, item.identifier);
    assert!(item.derivatives.paths().iter().all(|p| p.starts_with(&stem)));

    let thumb = image::load_from_memory(
        &test.storage.read(&item.derivatives.thumbnail).await.unwrap(),
    )
    .unwrap();
    let (width, height) = thumb.dimensions();
    assert!(width <= 150 && height <= 150);

    let large = image::load_from_memory(
        &test.storage.read(&item.derivatives.large).await.unwrap(),
    )
    .unwrap();
    assert_eq!(large.dimensions(), (1200, 1200));

    let original = image::load_from_memory(
        &test.storage.read(&item.derivatives.original).await.unwrap(),
    )
    .unwrap();
    assert_eq!(original.dimensions(), (2000, 3000));

    assert!(!staging_path.exists());
}

#[tokio::test]
async fn test_oversized_png_writes_nothing() {
    let test = setup_test_pipeline();
    let mut data = create_test_png(8, 8);
    data.resize(15 * 1024 * 1024, 0);
    let candidate = test.stage("poster.png", "image/png", &data);

    let results = test
        .pipeline
        .process_uploads(CATEGORY, vec![candidate])
        .await
        .unwrap();

    assert!(matches!(
        results[0],
        Err(MediaError::PayloadTooLarge { .. })
    ));
    assert!(files_under(test.root.path()).is_empty());
}

#[tokio::test]
async fn test_failed_derivative_write_rolls_back_and_keeps_original() {
    let test = setup_test_pipeline_with(PipelineConfig::default(), |local| {
        Arc::new(FlakyStorage::failing_writes(local, "_large.webp")) as Arc<dyn Storage>
    });

    let results = test
        .pipeline
        .process_uploads(
            CATEGORY,
            vec![test.stage("shelf.jpg", "image/jpeg", &create_test_jpeg(1600, 1600))],
        )
        .await
        .unwrap();

    assert!(matches!(
        results[0],
        Err(MediaError::ImageProcessingFailed { .. })
    ));

    // Everything written for the candidate is gone except the stored original.
    let files = test.stored_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "jpg");
}

#[tokio::test]
async fn test_unwritable_root_is_fatal() {
    let test = setup_test_pipeline();
    std::fs::write(test.category_dir(), b"a file where the directory should be").unwrap();

    let result = test
        .pipeline
        .process_uploads(
            CATEGORY,
            vec![test.stage("a.jpg", "image/jpeg", &create_test_jpeg(16, 16))],
        )
        .await;

    assert!(matches!(result, Err(MediaError::FatalStorage(_))));
}

#[tokio::test]
async fn test_placement_failure_halts_remaining_candidates() {
    let test = setup_test_pipeline_with(PipelineConfig::default(), |local| {
        Arc::new(FlakyStorage::failing_imports(local)) as Arc<dyn Storage>
    });
    let candidates = vec![
        test.stage("one.jpg", "image/jpeg", &create_test_jpeg(64, 64)),
        test.stage("two.jpg", "image/jpeg", &create_test_jpeg(64, 64)),
        test.stage("three.png", "image/png", &create_test_png(64, 64)),
    ];

    let results = test
        .pipeline
        .process_uploads(CATEGORY, candidates)
        .await
        .unwrap();

    assert!(matches!(results[0], Err(MediaError::FatalStorage(_))));
    for (index, expected) in [(1, "two.jpg"), (2, "three.png")] {
        match &results[index] {
            Err(MediaError::NotProcessed { filename, .. }) => assert_eq!(filename, expected),
            other => panic!("unexpected: {:?}", other),
        }
    }
    assert!(test.stored_files().is_empty());
}

#[tokio::test]
async fn test_strip_beyond_webp_limit_fails_cleanly() {
    let test = setup_test_pipeline();
    let results = test
        .pipeline
        .process_uploads(
            CATEGORY,
            vec![test.stage("strip.png", "image/png", &create_test_png(17000, 4))],
        )
        .await
        .unwrap();

    match &results[0] {
        Err(MediaError::ImageProcessingFailed { filename, reason }) => {
            assert_eq!(filename, "strip.png");
            assert!(reason.contains("webp encode failed"), "{reason}");
            assert!(!reason.contains("panicked"), "{reason}");
        }
        other => panic!("unexpected: {:?}", other),
    }

    // Nothing rendered was kept; the stored original stays for inspection.
    let files = test.stored_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "png");
}

#[tokio::test]
async fn test_ensure_storage_ready_is_idempotent_under_concurrency() {
    let test = setup_test_pipeline();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = test.pipeline.clone();
            tokio::spawn(async move { pipeline.ensure_storage_ready("avatars").await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert!(test.root.path().join("avatars").is_dir());
}

#[tokio::test]
async fn test_in_memory_candidate_and_json_shape() {
    let test = setup_test_pipeline();
    let candidate = UploadCandidate::in_memory("scan.png", "image/png", create_test_png(64, 48));

    let results = test
        .pipeline
        .process_uploads(CATEGORY, vec![candidate])
        .await
        .unwrap();
    let item = results[0].as_ref().unwrap();

    let json = serde_json::to_value(item).unwrap();
    assert_eq!(json["original_filename"], "scan.png");
    assert_eq!(json["derivatives"].as_object().unwrap().len(), 5);
    assert_eq!(json["width"], 64);
}
