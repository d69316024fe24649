//! # newscap
//!
//! Data preparation and dataset readers for news image captioning corpora
//! (GoodNews, VisualNews).
//!
//! ## Getting started
//!
//! ```sh
//! newscap 0.1.0
//! news image captioning data preparation.
//!
//! USAGE:
//!     newscap <SUBCOMMAND>
//!
//! SUBCOMMANDS:
//!     cleanup    Normalize ids and split keys of a store directory
//!     count      Count splits with detected faces
//!     help       Prints this message or the help of the given subcommand(s)
//!     read       Read assembled records of a split
//!     schema     Print the JSON schemas of the stored documents
//! ```
//!
//! Logging is configured with `RUST_LOG` (e.g. `RUST_LOG=info`).
use std::fs::File;
use std::io::{self, BufWriter, Write};

use serde::Serialize;
use structopt::StructOpt;

use newscap::error::Error;
use newscap::processing::{cleanup_dir, count_faces, KeyCleanup};
use newscap::reader::{FaceNerMatchedReader, RecordMetadata};
use newscap::store::{MemoryStore, RecordStore};
use newscap::types::{Article, ObjectFeatures, Split};

#[macro_use]
extern crate log;

mod cli;

/// One output line of the `read` command.
#[derive(Serialize)]
struct ReadLine<'a> {
    #[serde(flatten)]
    metadata: &'a RecordMetadata,
    context_tokens: usize,
    caption_tokens: usize,
    face_rows: usize,
    obj_rows: Option<usize>,
}

fn open_store(args: &cli::StoreArgs) -> Result<Box<dyn RecordStore>, Error> {
    #[cfg(feature = "mongo")]
    if let Some(uri) = &args.mongo_uri {
        let store = newscap::store::MongoStore::connect(uri, &args.db)?;
        return Ok(Box::new(store));
    }

    match &args.src {
        Some(src) => Ok(Box::new(MemoryStore::from_dir(src)?)),
        None => Err(Error::Custom("no store given".to_string())),
    }
}

fn read(r: cli::Read) -> Result<(), Error> {
    let config = r.reader_config()?;
    debug!("reader config\n{:#?}", config);
    let store = open_store(&r.store)?;
    let reader = FaceNerMatchedReader::with_default_tokenizer(store, config);

    let records = reader.read(&r.split)?;
    let mut dst: Box<dyn Write> = match &r.dst {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut nb = 0;
    for record in records.take(r.limit.unwrap_or(usize::MAX)) {
        let line = ReadLine {
            metadata: &record.metadata,
            context_tokens: record.context.len(),
            caption_tokens: record.caption.len(),
            face_rows: record.face_embeds.rows(),
            obj_rows: record.obj_embeds.as_ref().map(|e| e.rows()),
        };
        serde_json::to_writer(&mut dst, &line)?;
        dst.write_all(b"\n")?;
        nb += 1;
    }
    dst.flush()?;
    info!("wrote {} records", nb);
    Ok(())
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Newscap::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Newscap::Read(r) => read(r)?,

        cli::Newscap::Count(c) => {
            let store = open_store(&c.store)?;
            let counts = count_faces(&store)?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }

        cli::Newscap::Cleanup(c) => {
            let defaults = KeyCleanup::default();
            let keys = KeyCleanup::new(
                c.keep.unwrap_or_else(|| defaults.keep_keys().to_vec()),
                c.drop.unwrap_or_else(|| defaults.drop_keys().to_vec()),
            )?;
            let report = cleanup_dir(&c.src, &c.dst, &keys)?;
            info!("{:?}", report);
        }

        cli::Newscap::Schema => {
            let schemas = serde_json::json!({
                "articles": schemars::schema_for!(Article),
                "splits": schemars::schema_for!(Split),
                "objects": schemars::schema_for!(ObjectFeatures),
            });
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
    };
    Ok(())
}
