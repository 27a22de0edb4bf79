mod batch;

pub use batch::BatchOutcome;
pub use batch::BatchRecord;

pub(crate) use batch::datetime_to_epoch_seconds;
