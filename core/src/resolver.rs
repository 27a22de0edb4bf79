use crate::CompletedTimeline;
use cloud_incr_config::ConfigError;
use cloud_incr_protocol::Instant;
use cloud_incr_protocol::MissingCheckpointStrategy;
use cloud_incr_protocol::QueryInfo;
use cloud_incr_protocol::QueryType;
use cloud_incr_protocol::begin_instant_from_checkpoint;

/// Turn the last checkpoint into the next range to fetch.
///
/// A non-empty checkpoint is the instant already consumed, so the range
/// starts strictly after it. Without one, `strategy` decides where to start
/// and its absence is a configuration error. The end is the last of the next
/// `num_instants_per_fetch` completed instants, or the start itself when no
/// instant follows it.
pub fn resolve_query_info(
    timeline: &CompletedTimeline,
    checkpoint: Option<&str>,
    num_instants_per_fetch: usize,
    strategy: Option<MissingCheckpointStrategy>,
) -> Result<QueryInfo, ConfigError> {
    if num_instants_per_fetch == 0 {
        return Err(ConfigError::InvalidValue {
            key: "num_instants_per_fetch",
            message: "must be a positive number of instants".to_string(),
        });
    }

    let begin = match begin_instant_from_checkpoint(checkpoint) {
        Some(begin) => begin,
        None => match strategy {
            Some(MissingCheckpointStrategy::FromEarliestRetained) => Instant::origin(),
            // Start just before the latest instant so the range holds it.
            Some(MissingCheckpointStrategy::FromLatest) => timeline
                .last_instant()
                .and_then(|last| timeline.find_instant_before(last))
                .cloned()
                .unwrap_or_else(Instant::origin),
            None => return Err(ConfigError::MissingCheckpointStrategy),
        },
    };

    let previous = if begin.is_origin() {
        begin.clone()
    } else {
        timeline
            .find_instant_before(&begin)
            .cloned()
            .unwrap_or_else(|| begin.clone())
    };

    let end = timeline
        .instants_after(&begin, num_instants_per_fetch)
        .last()
        .cloned()
        .unwrap_or_else(|| begin.clone());

    let query_type = if strategy == Some(MissingCheckpointStrategy::FromLatest)
        || !timeline.is_before_timeline_starts(&begin)
    {
        QueryType::Incremental
    } else {
        QueryType::Snapshot
    };

    Ok(QueryInfo::new(query_type, previous, begin, end))
}
