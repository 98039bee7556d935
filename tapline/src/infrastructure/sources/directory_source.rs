// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! A pull-based tailer over a single delimited log file (spec §4.7): each
//! `poll()` reads whatever complete lines have been appended since the
//! last call and feeds them through a `DelimitedParser`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use tapline_domain::entities::{Envelope, Record};
use tapline_domain::error::{AgentError, AgentResult};
use tapline_domain::parsing::{DelimitedParser, ParsedLine};
use tapline_domain::ports::Source;

pub struct DirectorySource {
    name: String,
    path: PathBuf,
    parser: DelimitedParser,
    position: AtomicU64,
    line_number: AtomicU64,
}

impl DirectorySource {
    pub fn new(name: impl Into<String>, path: PathBuf, parser: DelimitedParser) -> Self {
        Self {
            name: name.into(),
            path,
            parser,
            position: AtomicU64::new(0),
            line_number: AtomicU64::new(0),
        }
    }

    async fn read_new_bytes(&self) -> AgentResult<String> {
        let mut file = File::open(&self.path).await?;
        let start = self.position.load(Ordering::SeqCst);
        file.seek(std::io::SeekFrom::Start(start)).await?;
        let mut buf = String::new();
        let read = file.read_to_string(&mut buf).await?;
        self.position.store(start + read as u64, Ordering::SeqCst);
        Ok(buf)
    }
}

#[async_trait]
impl Source for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&self) -> AgentResult<Vec<Envelope<String>>> {
        let chunk = self.read_new_bytes().await?;
        let mut envelopes = Vec::new();

        for line in chunk.lines() {
            let line_no = self.line_number.fetch_add(1, Ordering::SeqCst) + 1;
            match self.parser.feed_line(line) {
                ParsedLine::Comment | ParsedLine::Header => continue,
                ParsedLine::Data(record) => {
                    let timestamp = match record.timestamp() {
                        Ok(ts) => ts,
                        Err(AgentError::ParseError { message, .. }) => {
                            tracing::warn!(source = %self.name, line = line_no, %message, "skipping unparseable record");
                            continue;
                        }
                        Err(err) => return Err(err),
                    };
                    let envelope = Envelope::new(timestamp, line.to_string())
                        .with_raw_record(line)
                        .with_source_path(self.path.to_string_lossy().into_owned())
                        .with_position(self.position.load(Ordering::SeqCst), line_no);
                    envelopes.push(envelope);
                }
            }
        }

        Ok(envelopes)
    }
}
