// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use super::{BlockRange, BlockSource};
use crate::{
    error::{ProcessorError, ProcessorResult},
    types::BlockData,
};
use async_trait::async_trait;
use std::path::Path;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncRead, BufReader, Lines},
};
use tracing::{debug, info};

/// Reads one JSON-encoded [`BlockData`] per line, as dumped by the EVM archive.
///
/// Blocks below the range start are skipped. The feed ends at the first block past the
/// range end.
pub struct JsonLinesBlockSource<R> {
    lines: Lines<BufReader<R>>,
    line_number: usize,
    range: BlockRange,
    batch_size: usize,
    finished: bool,
}

impl JsonLinesBlockSource<File> {
    pub async fn open(
        path: impl AsRef<Path>,
        range: BlockRange,
        batch_size: usize,
    ) -> ProcessorResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            ProcessorError::process(format!("Failed to open {}: {}", path.display(), e))
        })?;
        info!("📂 Reading blocks from {}", path.display());
        Ok(Self::new(file, range, batch_size))
    }
}

impl<R: AsyncRead + Unpin + Send> JsonLinesBlockSource<R> {
    pub fn new(reader: R, range: BlockRange, batch_size: usize) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_number: 0,
            range,
            batch_size: batch_size.max(1),
            finished: false,
        }
    }

    async fn next_block(&mut self) -> ProcessorResult<Option<BlockData>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .map_err(|e| ProcessorError::process(format!("Failed to read block feed: {}", e)))?
        {
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut block: BlockData = serde_json::from_str(&line).map_err(|e| {
                ProcessorError::MalformedInput(format!("line {}: {}", self.line_number, e))
            })?;
            let height = block.header.height;
            if self.range.is_past_end(height) {
                debug!("Block {} is past the configured range, stopping", height);
                self.finished = true;
                return Ok(None);
            }
            if !self.range.contains(height) {
                continue;
            }

            block.link_transactions();
            return Ok(Some(block));
        }
        self.finished = true;
        Ok(None)
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> BlockSource for JsonLinesBlockSource<R> {
    async fn next_batch(&mut self) -> ProcessorResult<Option<Vec<BlockData>>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        while !self.finished && batch.len() < self.batch_size {
            match self.next_block().await? {
                Some(block) => batch.push(block),
                None => break,
            }
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn feed(heights: &[u64]) -> Cursor<Vec<u8>> {
        let mut raw = String::new();
        for height in heights {
            raw.push_str(&format!(
                r#"{{"header":{{"id":"b{h}","height":{h},"timestamp":1000}},"transactions":[{{"id":"t{h}","hash":"0x{h}","from":"0x01"}}]}}"#,
                h = height
            ));
            raw.push_str("\n\n");
        }
        Cursor::new(raw.into_bytes())
    }

    fn heights(batch: &[BlockData]) -> Vec<u64> {
        batch.iter().map(|block| block.header.height).collect()
    }

    #[tokio::test]
    async fn test_batches_and_links_transactions() {
        let mut source = JsonLinesBlockSource::new(feed(&[1, 2, 3]), BlockRange::default(), 2);

        let first = source.next_batch().await.unwrap().unwrap();
        assert_eq!(heights(&first), vec![1, 2]);
        assert_eq!(first[1].transactions[0].block.id, "b2");

        let second = source.next_batch().await.unwrap().unwrap();
        assert_eq!(heights(&second), vec![3]);
        assert!(source.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_honors_block_range() {
        let mut source =
            JsonLinesBlockSource::new(feed(&[1, 2, 3, 4, 5]), BlockRange::new(2, Some(3)), 10);

        let batch = source.next_batch().await.unwrap().unwrap();
        assert_eq!(heights(&batch), vec![2, 3]);
        assert!(source.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_line_is_reported() {
        let raw = "{\"header\":{\"id\":\"b1\",\"height\":1,\"timestamp\":0}}\nnot json\n";
        let mut source =
            JsonLinesBlockSource::new(Cursor::new(raw.as_bytes().to_vec()), BlockRange::default(), 5);

        let err = source.next_batch().await.unwrap_err();
        assert!(matches!(err, ProcessorError::MalformedInput(ref msg) if msg.starts_with("line 2")));
    }

    #[tokio::test]
    async fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.jsonl");
        std::fs::write(&path, feed(&[7]).into_inner()).unwrap();

        let mut source = JsonLinesBlockSource::open(&path, BlockRange::default(), 10)
            .await
            .unwrap();
        let batch = source.next_batch().await.unwrap().unwrap();
        assert_eq!(heights(&batch), vec![7]);
    }
}
