use std::fs::File;
use std::io::Write;
use std::path::Path;

use image::{ImageBuffer, Rgb};
use serde_json::{json, Value};

use newscap::error::Error;
use newscap::features::Embeddings;
use newscap::reader::{DatasetKind, FaceNerMatchedReader, ReaderConfig};
use newscap::store::{MemoryStore, ARTICLES_FILE, OBJECTS_FILE, SPLITS_FILE};
use newscap::types::{DocId, SplitName};

fn write_lines(dst: &Path, docs: &[Value]) {
    let mut f = File::create(dst).unwrap();
    for doc in docs {
        writeln!(f, "{}", doc).unwrap();
    }
}

fn write_image(dst: &Path) {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = ImageBuffer::from_pixel(8, 6, Rgb([120u8, 60, 30]));
    img.save(dst).unwrap();
}

fn ent(text: &str, label: &str) -> Value {
    json!({"start": 0, "end": text.len(), "text": text, "label": label})
}

fn alice_article(id: i64) -> Value {
    json!({
        "_id": id,
        "context": "Alice met Bob today.",
        "images": {"0": "Alice and Bob"},
        "context_ner": [ent("Alice", "PERSON"), ent("Bob", "PERSON")],
        "caption_ner": [[ent("Alice", "PERSON"), ent("Bob", "PERSON")]],
        "web_url": format!("https://example.com/{id}"),
    })
}

fn split(id: &str, article_id: i64, split: &str, n_faces: usize) -> Value {
    let mut doc = json!({
        "_id": id,
        "article_id": article_id,
        "image_index": 0,
        "split": split,
    });
    if n_faces > 0 {
        doc["facenet_details"] = json!({
            "n_faces": n_faces,
            "embeddings": (0..n_faces).map(|i| vec![i as f32; 4]).collect::<Vec<_>>(),
            "detect_probs": vec![0.9; n_faces],
        });
    }
    doc
}

/// Store with train articles 7 (with image) and 8 (without), and `n_val` val articles.
fn gen_store(dir: &Path, n_val: i64) -> MemoryStore {
    let images = dir.join("images");
    let mut articles = vec![alice_article(7), alice_article(8)];
    let mut splits = vec![split("7_0", 7, "train", 2), split("8_0", 8, "train", 2)];
    write_image(&images.join("7_0.jpg"));

    for i in 100..100 + n_val {
        articles.push(alice_article(i));
        splits.push(split(&format!("{i}_0"), i, "val", 0));
        write_image(&images.join(format!("{i}_0.jpg")));
    }

    write_lines(&dir.join(ARTICLES_FILE), &articles);
    write_lines(&dir.join(SPLITS_FILE), &splits);
    MemoryStore::from_dir(dir).unwrap()
}

fn gen_config(dir: &Path) -> ReaderConfig {
    ReaderConfig {
        image_dir: dir.join("images"),
        ..Default::default()
    }
}

#[test_log::test]
fn end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = gen_store(dir.path(), 0);
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, gen_config(dir.path()));

    let records: Vec<_> = reader.read("train").unwrap().collect();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.metadata.id, DocId::from("7_0"));
    assert_eq!(record.metadata.names, vec!["Alice", "Bob"]);
    assert_eq!(record.metadata.caption, "Alice and Bob");
    assert_eq!(record.metadata.context, "Alice met Bob today.");
    assert_eq!(record.metadata.web_url, "https://example.com/7");
    assert_eq!(
        record.metadata.image_path,
        dir.path().join("images").join("7_0.jpg")
    );
    assert_eq!(record.face_embeds.rows(), 2);
    assert_eq!(record.face_embeds.cols(), 4);
    assert_eq!(record.names.len(), 2);
    assert!(record.obj_embeds.is_none());
    assert_eq!(record.image.width(), 8);
}

#[test_log::test]
fn missing_image_skips_one() {
    let dir = tempfile::tempdir().unwrap();
    let store = gen_store(dir.path(), 0);
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, gen_config(dir.path()));

    let mut records = reader.iterate(SplitName::Train).unwrap();
    let total = records.total();
    let yielded = records.by_ref().count();
    assert_eq!(total, 2);
    assert_eq!(yielded, total - 1);
    assert_eq!(records.skipped(), 1);
}

#[test]
fn face_count_override() {
    let dir = tempfile::tempdir().unwrap();
    let store = gen_store(dir.path(), 0);

    let config = ReaderConfig {
        n_faces: Some(1),
        ..gen_config(dir.path())
    };
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
    let record = reader.iterate(SplitName::Train).unwrap().next().unwrap();
    assert_eq!(record.face_embeds.rows(), 1);

    let config = ReaderConfig {
        n_faces: Some(0),
        ..gen_config(dir.path())
    };
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
    let record = reader.iterate(SplitName::Train).unwrap().next().unwrap();
    assert!(record.face_embeds.is_empty());
}

#[test]
fn val_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let store = gen_store(dir.path(), 12);

    let config = ReaderConfig {
        eval_limit: 5,
        ..gen_config(dir.path())
    };
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
    assert_eq!(reader.read("val").unwrap().count(), 5);

    let config = ReaderConfig {
        eval_limit: 0,
        ..gen_config(dir.path())
    };
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
    assert_eq!(reader.read("val").unwrap().count(), 12);
}

#[test]
fn shuffle_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let store = gen_store(dir.path(), 12);
    let config = ReaderConfig {
        eval_limit: 0,
        ..gen_config(dir.path())
    };

    let order = |config: ReaderConfig| -> Vec<DocId> {
        let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
        reader
            .iterate(SplitName::Val)
            .unwrap()
            .map(|r| r.metadata.id)
            .collect()
    };

    let first = order(config.clone());
    let second = order(config.clone());
    assert_eq!(first.len(), 12);
    assert_eq!(first, second);

    // same reader, two passes
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
    let a: Vec<DocId> = reader.iterate(SplitName::Val).unwrap().map(|r| r.metadata.id).collect();
    let b: Vec<DocId> = reader.iterate(SplitName::Val).unwrap().map(|r| r.metadata.id).collect();
    assert_eq!(a, b);
    assert_eq!(a, first);
}

#[test]
fn unknown_split_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = gen_store(dir.path(), 0);
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, gen_config(dir.path()));
    match reader.read("valid") {
        Err(Error::UnknownSplit(s)) => assert_eq!(s, "valid"),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("unknown split accepted"),
    }
}

#[test]
fn context_truncation() {
    let dir = tempfile::tempdir().unwrap();
    let words = |n: usize| (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");

    let mut articles = Vec::new();
    let mut splits = Vec::new();
    for (id, n) in [(1, 500), (2, 501)] {
        articles.push(json!({"_id": id, "context": words(n), "images": {"0": "c"}}));
        splits.push(split(&format!("{id}_0"), id, "test", 0));
        write_image(&dir.path().join("images").join(format!("{id}_0.jpg")));
    }
    write_lines(&dir.path().join(ARTICLES_FILE), &articles);
    write_lines(&dir.path().join(SPLITS_FILE), &splits);
    let store = MemoryStore::from_dir(dir.path()).unwrap();

    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, gen_config(dir.path()));
    let mut records: Vec<_> = reader.iterate(SplitName::Test).unwrap().collect();
    records.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));

    assert_eq!(records[0].metadata.context, words(500));
    assert_eq!(records[1].metadata.context, words(500));
    assert!(records.iter().all(|r| r.names.is_empty()));
}

#[test]
fn visualnews_layout() {
    let dir = tempfile::tempdir().unwrap();
    let articles = vec![json!({
        "_id": "9_0",
        "context": "Carol spoke in Paris.",
        "images": {"0": "Carol in Paris"},
        "image_path": "./bbc/9.jpg",
        "context_ner": [ent("Carol", "PERSON"), ent("Paris", "GPE"), ent("Monday", "DATE")],
    })];
    let splits = vec![split("9_0", 9, "test", 3)];
    write_lines(&dir.path().join(ARTICLES_FILE), &articles);
    write_lines(&dir.path().join(SPLITS_FILE), &splits);
    write_lines(
        &dir.path().join(OBJECTS_FILE),
        &[json!({"_id": 9, "object_features": [[1.0, 2.0], [3.0, 4.0]]})],
    );
    write_image(&dir.path().join("images").join("bbc").join("9.jpg"));
    let store = MemoryStore::from_dir(dir.path()).unwrap();

    let config = ReaderConfig {
        dataset: DatasetKind::VisualNews,
        use_objects: true,
        use_caption_names: false,
        with_ner: true,
        ..gen_config(dir.path())
    };
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
    let records: Vec<_> = reader.iterate(SplitName::Test).unwrap().collect();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.metadata.names, vec!["Carol", "Paris"]);
    assert_eq!(record.metadata.context, "Carol, Paris.\n\nCarol spoke in Paris.");
    // default face count
    assert_eq!(record.face_embeds.rows(), 3);
    assert_eq!(record.obj_embeds.as_ref().map(|e| e.rows()), Some(2));
}

#[test]
fn missing_objects_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = gen_store(dir.path(), 0);
    assert!(!dir.path().join(OBJECTS_FILE).exists());

    let config = ReaderConfig {
        use_objects: true,
        ..gen_config(dir.path())
    };
    let reader = FaceNerMatchedReader::with_default_tokenizer(&store, config);
    let records: Vec<_> = reader.iterate(SplitName::Train).unwrap().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].obj_embeds, Some(Embeddings::Empty));
    assert_eq!(records[0].face_embeds.rows(), 2);
}
