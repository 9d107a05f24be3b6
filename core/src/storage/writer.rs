//! Parquet writer for timeline rows.

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder, UInt32Builder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use castline_types::{ASSIGNMENT_SLOTS, TimelineRow};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use super::StorageError;

/// Buffers timeline rows and writes them as one parquet file.
pub struct TimelineWriter {
    rows: Vec<TimelineRow>,
}

impl TimelineWriter {
    pub fn new() -> Self {
        Self {
            rows: Vec::with_capacity(512),
        }
    }

    pub fn push(&mut self, row: TimelineRow) {
        self.rows.push(row);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = TimelineRow>) {
        self.rows.extend(rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write buffered rows. An empty buffer still produces a file with the
    /// schema so an empty timeline exports cleanly.
    pub fn write_to_file(&self, path: &Path) -> Result<(), StorageError> {
        let schema = Self::schema();
        let batch = self.build_record_batch(&schema)?;

        let file = File::create(path).map_err(|source| StorageError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(Default::default()))
            .build();

        let write = || -> Result<(), parquet::errors::ParquetError> {
            let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
            writer.write(&batch)?;
            writer.close()?;
            Ok(())
        };
        write().map_err(|source| StorageError::WriteParquet {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), rows = self.rows.len(), "Wrote parquet timeline");
        Ok(())
    }

    fn schema() -> Arc<Schema> {
        let mut fields = vec![
            Field::new("time", DataType::Utf8, false),
            Field::new("offset_ms", DataType::Int64, false),
            Field::new("timestamp_ms", DataType::Int64, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("ability_id", DataType::Int64, false),
            Field::new("ability", DataType::Utf8, false),
            Field::new("damage_kind", DataType::Utf8, false),
            Field::new("direct_damage", DataType::Int64, true),
            Field::new("absorbed", DataType::Int64, true),
            Field::new("multiplier", DataType::Float64, true),
            Field::new("raw_damage", DataType::Int64, true),
            Field::new("targets_hit", DataType::UInt32, false),
            Field::new("dot_duration_ms", DataType::Int64, true),
            Field::new("dot_average_raw_per_tick", DataType::Int64, true),
            Field::new("is_outlier", DataType::Boolean, false),
        ];
        fields.extend(
            ASSIGNMENT_SLOTS
                .iter()
                .map(|slot| Field::new(*slot, DataType::Utf8, false)),
        );
        Arc::new(Schema::new(fields))
    }

    fn build_record_batch(&self, schema: &Arc<Schema>) -> Result<RecordBatch, StorageError> {
        let len = self.rows.len();

        let mut time = StringBuilder::with_capacity(len, len * 6);
        let mut offset_ms = Int64Builder::with_capacity(len);
        let mut timestamp_ms = Int64Builder::with_capacity(len);
        let mut source = StringBuilder::with_capacity(len, len * 20);
        let mut ability_id = Int64Builder::with_capacity(len);
        let mut ability = StringBuilder::with_capacity(len, len * 24);
        let mut damage_kind = StringBuilder::with_capacity(len, len * 8);
        let mut direct_damage = Int64Builder::with_capacity(len);
        let mut absorbed = Int64Builder::with_capacity(len);
        let mut multiplier = Float64Builder::with_capacity(len);
        let mut raw_damage = Int64Builder::with_capacity(len);
        let mut targets_hit = UInt32Builder::with_capacity(len);
        let mut dot_duration_ms = Int64Builder::with_capacity(len);
        let mut dot_average = Int64Builder::with_capacity(len);
        let mut is_outlier = BooleanBuilder::with_capacity(len);
        let mut assignments: Vec<StringBuilder> = ASSIGNMENT_SLOTS
            .iter()
            .map(|_| StringBuilder::with_capacity(len, 0))
            .collect();

        for row in &self.rows {
            time.append_value(&row.time);
            offset_ms.append_value(row.offset_ms);
            timestamp_ms.append_value(row.timestamp_ms);
            source.append_value(&row.source);
            ability_id.append_value(row.ability_id);
            ability.append_value(&row.ability);
            damage_kind.append_value(&row.damage_kind);
            direct_damage.append_option(row.direct_damage);
            absorbed.append_option(row.absorbed);
            multiplier.append_option(row.multiplier);
            raw_damage.append_option(row.raw_damage);
            targets_hit.append_value(u32::try_from(row.targets_hit).unwrap_or(u32::MAX));
            dot_duration_ms.append_option(row.dot_duration_ms);
            dot_average.append_option(row.dot_average_raw_per_tick);
            is_outlier.append_value(row.is_outlier);
            for (builder, value) in assignments.iter_mut().zip(row.assignments.values()) {
                builder.append_value(value);
            }
        }

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(time.finish()),
            Arc::new(offset_ms.finish()),
            Arc::new(timestamp_ms.finish()),
            Arc::new(source.finish()),
            Arc::new(ability_id.finish()),
            Arc::new(ability.finish()),
            Arc::new(damage_kind.finish()),
            Arc::new(direct_damage.finish()),
            Arc::new(absorbed.finish()),
            Arc::new(multiplier.finish()),
            Arc::new(raw_damage.finish()),
            Arc::new(targets_hit.finish()),
            Arc::new(dot_duration_ms.finish()),
            Arc::new(dot_average.finish()),
            Arc::new(is_outlier.finish()),
        ];
        columns.extend(
            assignments
                .iter_mut()
                .map(|builder| Arc::new(builder.finish()) as ArrayRef),
        );

        Ok(RecordBatch::try_new(schema.clone(), columns)?)
    }
}

impl Default for TimelineWriter {
    fn default() -> Self {
        Self::new()
    }
}
