//! Rendering core for documentation snippets of captured HTTP requests.
//!
//! # Overview
//! Turns a `CapturedRequest` (what a test harness recorded about a request)
//! into a `RenderingModel` that an external template engine consumes, does
//! the same for a `CapturedResponse`, and selects constraint descriptions by
//! validation group. Nothing here touches
//! the network or holds state between calls; the caller supplies fully
//! materialized input and receives plain data back.
//!
//! # Design
//! - `RequestRenderer` is stateless. Header synthesis and body reconstruction
//!   are pure functions of the captured request.
//! - Multipart bodies always use `MULTIPART_BOUNDARY`, so the rendered
//!   `Content-Type` header and the body delimiters can never disagree.
//! - Constraint selection is a stable filter with set-intersection semantics
//!   over opaque `GroupMarker`s.
//! - Every boundary type derives serde, so the FFI and HTTP front ends pass
//!   JSON straight through.

pub mod constraints;
pub mod description;
pub mod error;
pub mod http;
pub mod renderer;
pub mod response;
pub mod types;

pub use constraints::{
    select_descriptions, Constraint, ConstraintDescriptionResolver, ConstraintResolver,
    DescribedConstraint, DescriptionQuery, GroupConstraintDescriptions, GroupMarker,
    StaticConstraintResolver,
};
pub use description::TemplateDescriptionResolver;
pub use error::RenderError;
pub use crate::http::{
    CapturedRequest, FilePart, Headers, HttpMethod, MultiMap, Parameters, PartContent,
};
pub use renderer::{BodyStrategy, RequestRenderer, MULTIPART_BOUNDARY};
pub use response::{CapturedResponse, ResponseRenderer};
pub use types::{RenderedHeader, RenderingModel, ResponseModel};
