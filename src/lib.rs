/*! # newscap

Data preparation and dataset readers for news image captioning corpora.

The core is [reader::FaceNerMatchedReader], which joins the `splits`, `articles` and `objects`
collections of a [store::RecordStore] into [reader::AssembledRecord]s, one split at a time,
in a reproducible shuffled order.

Offline steps that fill the store (entity annotation, face detection, cleanup) live in [processing].
!*/
pub mod error;
pub mod features;
pub mod filtering;
pub mod imaging;
pub mod processing;
pub mod reader;
pub mod store;
pub mod tokenize;
pub mod types;
