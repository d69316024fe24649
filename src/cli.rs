//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use newscap::error::Error;
use newscap::reader::{DatasetKind, ReaderConfig};

#[derive(Debug, StructOpt)]
#[structopt(name = "newscap", about = "news image captioning data preparation.")]
/// Holds every command that is callable by the `newscap` command.
pub enum Newscap {
    #[structopt(about = "Read assembled records of a split")]
    Read(Read),
    #[structopt(about = "Count splits with detected faces")]
    Count(Count),
    #[structopt(about = "Normalize ids and split keys of a store directory")]
    Cleanup(Cleanup),
    #[structopt(about = "Print the JSON schemas of the stored documents")]
    Schema,
}

#[derive(Debug, StructOpt)]
/// Store location.
///
/// A JSON lines directory (`articles.jsonl`, `splits.jsonl`, `objects.jsonl`),
/// or a MongoDB database when built with the `mongo` feature.
pub struct StoreArgs {
    #[structopt(
        parse(from_os_str),
        help = "store directory (articles.jsonl, splits.jsonl, optional objects.jsonl)"
    )]
    pub src: Option<PathBuf>,
    #[cfg(feature = "mongo")]
    #[structopt(long = "mongo-uri", help = "MongoDB uri, used instead of <src>")]
    pub mongo_uri: Option<String>,
    #[cfg(feature = "mongo")]
    #[structopt(long = "db", default_value = "goodnews", help = "MongoDB database")]
    pub db: String,
}

#[derive(Debug, StructOpt)]
/// Read command and parameters.
///
/// Flags override the values of the configuration file.
///
/// ```sh
/// newscap read val data/goodnews --image-dir data/goodnews/images --with-ner --dst val.jsonl
/// ```
pub struct Read {
    #[structopt(help = "train, val or test")]
    pub split: String,
    #[structopt(flatten)]
    pub store: StoreArgs,
    #[structopt(parse(from_os_str), long = "config", help = "JSON reader configuration")]
    pub config: Option<PathBuf>,
    #[structopt(long = "dataset", help = "goodnews or visualnews")]
    pub dataset: Option<DatasetKind>,
    #[structopt(parse(from_os_str), long = "image-dir", help = "image directory")]
    pub image_dir: Option<PathBuf>,
    #[structopt(long = "eval-limit", help = "cap on the val split, 0 for none")]
    pub eval_limit: Option<usize>,
    #[structopt(long = "n-faces", help = "fixed number of faces per record")]
    pub n_faces: Option<usize>,
    #[structopt(
        long = "no-caption-names",
        help = "do not size face lists on the caption person names"
    )]
    pub no_caption_names: bool,
    #[structopt(long = "use-objects", help = "attach object features")]
    pub use_objects: bool,
    #[structopt(long = "context-key", help = "article field used as context")]
    pub context_key: Option<String>,
    #[structopt(long = "with-abstract", help = "skip articles without an abstract")]
    pub with_abstract: bool,
    #[structopt(long = "with-ner", help = "prefix contexts with their names")]
    pub with_ner: bool,
    #[structopt(
        long = "all-entities",
        help = "keep every entity category, not only PERSON, ORG and GPE"
    )]
    pub all_entities: bool,
    #[structopt(long = "max-end", help = "maximum number of context tokens")]
    pub max_end: Option<usize>,
    #[structopt(long = "seed", help = "shuffling seed")]
    pub seed: Option<u64>,
    #[structopt(long = "limit", help = "stop after this many records")]
    pub limit: Option<usize>,
    #[structopt(
        parse(from_os_str),
        long = "dst",
        help = "output file. Leave blank for stdout."
    )]
    pub dst: Option<PathBuf>,
}

impl Read {
    /// Configuration file (or defaults) with the flags applied.
    pub fn reader_config(&self) -> Result<ReaderConfig, Error> {
        let mut config = match &self.config {
            Some(path) => ReaderConfig::from_path(path)?,
            None => ReaderConfig::default(),
        };

        if let Some(dataset) = self.dataset {
            config.dataset = dataset;
        }
        if let Some(image_dir) = &self.image_dir {
            config.image_dir = image_dir.clone();
        }
        if let Some(eval_limit) = self.eval_limit {
            config.eval_limit = eval_limit;
        }
        if self.n_faces.is_some() {
            config.n_faces = self.n_faces;
        }
        if let Some(context_key) = &self.context_key {
            config.context_key = context_key.clone();
        }
        if let Some(max_end) = self.max_end {
            config.max_end = max_end;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.use_caption_names &= !self.no_caption_names;
        config.restrict_entities &= !self.all_entities;
        config.use_objects |= self.use_objects;
        config.with_abstract |= self.with_abstract;
        config.with_ner |= self.with_ner;

        Ok(config)
    }
}

#[derive(Debug, StructOpt)]
pub struct Count {
    #[structopt(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, StructOpt)]
/// Cleanup command and parameters.
///
/// Default key lists are the VisualNews ones.
pub struct Cleanup {
    #[structopt(parse(from_os_str), help = "source store directory")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination store directory")]
    pub dst: PathBuf,
    #[structopt(long = "keep", use_delimiter = true, help = "split keys to keep")]
    pub keep: Option<Vec<String>>,
    #[structopt(long = "drop", use_delimiter = true, help = "split keys to remove")]
    pub drop: Option<Vec<String>>,
}
