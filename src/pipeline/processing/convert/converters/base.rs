use score_core::{ChartIdentity, ConversionResult, DryScore, SongIdentity};

use crate::pipeline::processing::convert::{ConverterFailure, ImportLogger, ReferenceResolver};

/// Shared utilities for converters
pub struct ConverterUtils;

impl ConverterUtils {
    /// A chart exists but its song does not: the catalog is out of sync with
    /// itself.
    /// Logged once, at severe, by whoever reports the returned failure.
    pub fn song_chart_desync(chart: &ChartIdentity) -> ConverterFailure {
        ConverterFailure::internal(format!(
            "Song-Chart desync with song ID {} ({}).",
            chart.song_id, chart.game
        ))
    }

    /// Look up the song a resolved chart belongs to
    pub async fn song_for_chart(
        resolver: &ReferenceResolver,
        chart: &ChartIdentity,
    ) -> Result<SongIdentity, ConverterFailure> {
        resolver
            .resolve_song(chart.game, chart.song_id)
            .await?
            .ok_or_else(|| Self::song_chart_desync(chart))
    }

    /// Assemble the result, checking song, chart and score agree
    pub fn finish(
        song: SongIdentity,
        chart: ChartIdentity,
        dry_score: DryScore,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure> {
        logger.debug(&format!(
            "Converted score on chart {} ({} {})",
            chart.chart_id, song.title, chart.difficulty
        ));
        Ok(ConversionResult::new(song, chart, dry_score)?)
    }

    /// Blank comments are no comment
    pub fn clean_comment(comment: Option<&str>) -> Option<String> {
        comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}
