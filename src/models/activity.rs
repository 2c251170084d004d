// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Sustainable-action model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A logged sustainable action, stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Server-generated UUID (also used as document ID)
    pub activity_id: String,
    /// Owning user
    pub user_id: String,
    /// Short title ("Biked to work")
    pub title: String,
    /// Action category ("transport", "energy", "waste", "food", ...)
    pub category: String,
    /// Calendar date the action happened on (UTC)
    pub occurred_on: NaiveDate,
    /// Optional free-form note
    pub description: Option<String>,
    /// Source: currently always "api"
    pub source: String,
    /// When this action was processed
    pub processed_at: String,
}
