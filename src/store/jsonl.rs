/*! JSON lines collections.

A store directory holds one file per collection, one document per line
(the layout produced by `mongoexport`).
Lines holding only `[` or `]` are skipped, so JSON arrays written one element per line are read too.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Read, Write};
use std::marker::PhantomData;
use std::path::Path;

use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::types::{Article, ObjectFeatures, Split};

use super::MemoryStore;

pub const ARTICLES_FILE: &str = "articles.jsonl";
pub const SPLITS_FILE: &str = "splits.jsonl";
pub const OBJECTS_FILE: &str = "objects.jsonl";

/// Iterator over the documents of a JSON lines file.
#[derive(Debug)]
pub struct JsonLines<T, R = File>
where
    R: Read,
{
    lines: Lines<BufReader<R>>,
    line_nb: usize,
    item: PhantomData<T>,
}

impl<T> JsonLines<T, File> {
    pub fn from_path(src: &Path) -> Result<Self, Error> {
        let handle = File::open(src)?;
        Ok(Self::new(handle))
    }
}

impl<T, R: Read> JsonLines<T, R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_nb: 0,
            item: PhantomData,
        }
    }
}

impl<T, R> Iterator for JsonLines<T, R>
where
    T: DeserializeOwned,
    R: Read,
{
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_nb += 1;
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };

            // array delimiters and trailing commas of pretty-printed arrays
            let line = line.trim().trim_end_matches(',');
            match line {
                "" | "[" | "]" => continue,
                s => {
                    return Some(serde_json::from_str::<T>(s).map_err(|e| {
                        Error::Custom(format!("line {}: {}", self.line_nb, e))
                    }))
                }
            }
        }
    }
}

/// Write `items` to `dst`, one JSON document per line.
pub fn write_jsonl<'a, T, I>(dst: &Path, items: I) -> Result<usize, Error>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut handle = BufWriter::new(File::create(dst)?);
    let mut nb = 0;
    for item in items {
        serde_json::to_writer(&mut handle, item)?;
        handle.write_all(b"\n")?;
        nb += 1;
    }
    handle.flush()?;
    Ok(nb)
}

impl MemoryStore {
    /// Load a store directory. `objects.jsonl` is optional.
    pub fn from_dir(src: &Path) -> Result<Self, Error> {
        let mut store = MemoryStore::default();

        for article in JsonLines::<Article>::from_path(&src.join(ARTICLES_FILE))? {
            store.insert_article(article?);
        }
        for split in JsonLines::<Split>::from_path(&src.join(SPLITS_FILE))? {
            store.insert_split(split?);
        }

        let objects = src.join(OBJECTS_FILE);
        if objects.exists() {
            for features in JsonLines::<ObjectFeatures>::from_path(&objects)? {
                store.insert_objects(features?);
            }
        }

        info!(
            "loaded {} articles, {} splits, {} object features from {:?}",
            store.articles().len(),
            store.splits().len(),
            store.objects().len(),
            src
        );
        Ok(store)
    }

    /// Write the store to `dst`, creating the directory if needed.
    pub fn save_dir(&self, dst: &Path) -> Result<(), Error> {
        std::fs::create_dir_all(dst)?;
        write_jsonl(&dst.join(ARTICLES_FILE), self.articles().values())?;
        write_jsonl(&dst.join(SPLITS_FILE), self.splits().values())?;
        if !self.objects().is_empty() {
            write_jsonl(&dst.join(OBJECTS_FILE), self.objects().values())?;
        }
        Ok(())
    }
}
