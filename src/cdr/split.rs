//! Splitting long calls at interval boundaries
//!
//! Mediation systems close a partial record at every interval boundary while a
//! call is still up. [`IntervalSplitter`] cuts a finished record at multiples
//! of the interval since the Unix epoch, so a 30 minute interval cuts at :00
//! and :30 of every hour.

use super::{Cdr, PartialRecord};
use crate::types::ServiceCategory;
use chrono::{DateTime, Utc};

/// Most pieces a single call is cut into; the last piece runs to the end of the call
pub const MAX_SPLIT_SEGMENTS: usize = 10_000;

/// Cuts records that cross interval boundaries into partial records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSplitter {
    interval_secs: i64,
}

impl IntervalSplitter {
    /// `None` for a zero interval or one beyond the timestamp range
    pub fn new(interval_secs: u64) -> Option<Self> {
        let interval_secs = i64::try_from(interval_secs).ok().filter(|secs| *secs > 0)?;
        Some(Self { interval_secs })
    }

    /// Interval length in seconds
    pub fn interval_secs(&self) -> u64 {
        self.interval_secs.unsigned_abs()
    }

    /// Cut `cdr` at every boundary strictly inside the call
    ///
    /// A call that crosses no boundary comes back untouched. Otherwise piece
    /// 1 keeps the record id and later pieces get ids derived from it; every
    /// piece carries the same [`PartialRecord::call_id`] and their durations
    /// add up to the original duration. SMS records are never cut.
    pub fn split(&self, cdr: Cdr) -> Vec<Cdr> {
        if cdr.service_category == ServiceCategory::Sms || cdr.partial.is_some() {
            return vec![cdr];
        }

        let bounds = self.bounds(&cdr);
        if bounds.len() <= 2 {
            return vec![cdr];
        }
        let segments = match u32::try_from(bounds.len() - 1) {
            Ok(segments) => segments,
            Err(_) => return vec![cdr],
        };

        let mut pieces = Vec::with_capacity(bounds.len() - 1);
        for (position, pair) in bounds.windows(2).enumerate() {
            let segment = position as u32 + 1;
            let timestamp_start = if segment == 1 {
                cdr.timestamp_start
            } else {
                match DateTime::<Utc>::from_timestamp(pair[0], 0) {
                    Some(start) => start,
                    None => return vec![cdr],
                }
            };
            let duration_seconds = u32::try_from(pair[1] - pair[0]).unwrap_or(u32::MAX);

            pieces.push(Cdr {
                id: cdr.id.segment(segment),
                timestamp_start,
                duration_seconds,
                partial: Some(PartialRecord { call_id: cdr.id, segment, segments }),
                ..cdr.clone()
            });
        }
        pieces
    }

    /// Call start, the boundaries inside the call and the call end, in seconds
    fn bounds(&self, cdr: &Cdr) -> Vec<i64> {
        let start = cdr.timestamp_start.timestamp();
        let end = start + i64::from(cdr.duration_seconds);

        let first = start
            .div_euclid(self.interval_secs)
            .checked_add(1)
            .and_then(|n| n.checked_mul(self.interval_secs));
        let mut bounds = vec![start];
        let mut boundary = first;
        while let Some(at) = boundary {
            if at >= end || bounds.len() >= MAX_SPLIT_SEGMENTS {
                break;
            }
            bounds.push(at);
            boundary = at.checked_add(self.interval_secs);
        }
        bounds.push(end);
        bounds
    }
}
