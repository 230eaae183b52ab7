// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data source traits.
//!
//! Every source implements [`DataSource`] plus the capability trait of its
//! kind. All traits use `#[async_trait]` so repositories can hold sources as
//! trait objects.

pub mod meal;
pub mod meal_type;
pub mod source;
pub mod sport;
pub mod user;

pub use meal::MealSource;
pub use meal_type::MealTypeSource;
pub use source::{DataSource, ListLookup, SingleLookup};
pub use sport::SportSource;
pub use user::UserSource;
