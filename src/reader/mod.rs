/*! Face and NER matched dataset readers.

Both the GoodNews and VisualNews layouts are read by [FaceNerMatchedReader],
the layout being chosen by [ReaderConfig::dataset].
!*/
mod assembler;
mod config;
mod iterator;

pub use assembler::{
    build_context, truncate_tokens, AssembledRecord, RecordAssembler, RecordMetadata, Skip,
};
pub use config::{DatasetKind, ReaderConfig, ABSTRACT_KEY};
pub use iterator::{FaceNerMatchedReader, Records};
