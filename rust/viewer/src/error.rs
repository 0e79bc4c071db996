// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewerError>;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("IFC error: {0}")]
    Core(#[from] ifc_audit_core::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] ifc_audit_geometry::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("No model loaded")]
    NoModel,
}
