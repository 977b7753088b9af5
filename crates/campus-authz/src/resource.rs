// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Instance attributes for conditional rules.
//!
//! [`ResourceData`] carries the attributes of one concrete resource instance,
//! supplied by the caller at decision time. Each variant holds only the
//! fields some condition reads. Every field is optional: a condition that
//! needs an absent field fails rather than erroring, so a sparse or
//! mismatched payload can only narrow access.

use serde::{Deserialize, Serialize};

use crate::error::{AuthzError, Result};
use crate::types::{Resource, SubjectId};

/// Publication state shared by courses, blog posts and reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
	Draft,
	Pending,
	Published,
	Archived,
	#[serde(other)]
	Other,
}

/// Reference to the course an instance belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRef {
	pub id: Option<String>,
	pub instructor_id: Option<SubjectId>,
}

impl CourseRef {
	pub fn taught_by(instructor_id: impl Into<SubjectId>) -> Self {
		Self {
			id: None,
			instructor_id: Some(instructor_id.into()),
		}
	}
}

/// A submission entry attached to an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionRef {
	pub user_id: Option<SubjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseAttrs {
	pub id: Option<String>,
	pub instructor_id: Option<SubjectId>,
	pub is_public: Option<bool>,
	pub status: Option<ContentStatus>,
}

impl CourseAttrs {
	pub fn with_instructor(mut self, instructor_id: impl Into<SubjectId>) -> Self {
		self.instructor_id = Some(instructor_id.into());
		self
	}

	pub fn with_public(mut self, is_public: bool) -> Self {
		self.is_public = Some(is_public);
		self
	}

	pub fn with_status(mut self, status: ContentStatus) -> Self {
		self.status = Some(status);
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentAttrs {
	pub id: Option<String>,
	pub user_id: Option<SubjectId>,
	pub course: Option<CourseRef>,
}

impl EnrollmentAttrs {
	pub fn with_user(mut self, user_id: impl Into<SubjectId>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	pub fn with_course(mut self, course: CourseRef) -> Self {
		self.course = Some(course);
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentAttrs {
	pub id: Option<String>,
	pub course: Option<CourseRef>,
	pub submissions: Vec<SubmissionRef>,
}

impl AssignmentAttrs {
	pub fn with_course(mut self, course: CourseRef) -> Self {
		self.course = Some(course);
		self
	}

	pub fn with_submission(mut self, user_id: impl Into<SubjectId>) -> Self {
		self.submissions.push(SubmissionRef {
			user_id: Some(user_id.into()),
		});
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogAttrs {
	pub id: Option<String>,
	pub author_id: Option<SubjectId>,
	pub status: Option<ContentStatus>,
}

impl BlogAttrs {
	pub fn with_author(mut self, author_id: impl Into<SubjectId>) -> Self {
		self.author_id = Some(author_id.into());
		self
	}

	pub fn with_status(mut self, status: ContentStatus) -> Self {
		self.status = Some(status);
		self
	}
}

/// Attributes of a user record; `id` is the user being acted upon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAttrs {
	pub id: Option<SubjectId>,
}

impl UserAttrs {
	pub fn new(id: impl Into<SubjectId>) -> Self {
		Self {
			id: Some(id.into()),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentAttrs {
	pub id: Option<String>,
	pub user_id: Option<SubjectId>,
}

impl PaymentAttrs {
	pub fn with_user(mut self, user_id: impl Into<SubjectId>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewAttrs {
	pub id: Option<String>,
	pub user_id: Option<SubjectId>,
	pub course: Option<CourseRef>,
	pub status: Option<ContentStatus>,
}

impl ReviewAttrs {
	pub fn with_user(mut self, user_id: impl Into<SubjectId>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	pub fn with_status(mut self, status: ContentStatus) -> Self {
		self.status = Some(status);
		self
	}
}

/// Attributes of one concrete resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum ResourceData {
	Course(CourseAttrs),
	Enrollment(EnrollmentAttrs),
	Assignment(AssignmentAttrs),
	Blog(BlogAttrs),
	User(UserAttrs),
	Payment(PaymentAttrs),
	Review(ReviewAttrs),
}

impl ResourceData {
	/// The resource kind these attributes describe.
	pub fn resource(&self) -> Resource {
		match self {
			ResourceData::Course(_) => Resource::Course,
			ResourceData::Enrollment(_) => Resource::Enrollment,
			ResourceData::Assignment(_) => Resource::Assignment,
			ResourceData::Blog(_) => Resource::Blog,
			ResourceData::User(_) => Resource::User,
			ResourceData::Payment(_) => Resource::Payment,
			ResourceData::Review(_) => Resource::Review,
		}
	}

	/// Decode an untagged JSON object as the attributes of `resource`.
	///
	/// Unknown fields are ignored and missing fields stay `None`.
	pub fn from_json(resource: Resource, value: serde_json::Value) -> Result<Self> {
		let invalid = |source| AuthzError::InvalidResourceData { resource, source };
		let data = match resource {
			Resource::Course => ResourceData::Course(serde_json::from_value(value).map_err(invalid)?),
			Resource::Enrollment => {
				ResourceData::Enrollment(serde_json::from_value(value).map_err(invalid)?)
			}
			Resource::Assignment => {
				ResourceData::Assignment(serde_json::from_value(value).map_err(invalid)?)
			}
			Resource::Blog => ResourceData::Blog(serde_json::from_value(value).map_err(invalid)?),
			Resource::User => ResourceData::User(serde_json::from_value(value).map_err(invalid)?),
			Resource::Payment => ResourceData::Payment(serde_json::from_value(value).map_err(invalid)?),
			Resource::Review => ResourceData::Review(serde_json::from_value(value).map_err(invalid)?),
			Resource::AdminPanel | Resource::Analytics | Resource::Settings => {
				return Err(AuthzError::NoInstanceAttributes(resource));
			}
		};
		Ok(data)
	}

	pub fn as_course(&self) -> Option<&CourseAttrs> {
		match self {
			ResourceData::Course(attrs) => Some(attrs),
			_ => None,
		}
	}

	pub fn as_enrollment(&self) -> Option<&EnrollmentAttrs> {
		match self {
			ResourceData::Enrollment(attrs) => Some(attrs),
			_ => None,
		}
	}

	pub fn as_assignment(&self) -> Option<&AssignmentAttrs> {
		match self {
			ResourceData::Assignment(attrs) => Some(attrs),
			_ => None,
		}
	}

	pub fn as_blog(&self) -> Option<&BlogAttrs> {
		match self {
			ResourceData::Blog(attrs) => Some(attrs),
			_ => None,
		}
	}

	pub fn as_user(&self) -> Option<&UserAttrs> {
		match self {
			ResourceData::User(attrs) => Some(attrs),
			_ => None,
		}
	}

	pub fn as_payment(&self) -> Option<&PaymentAttrs> {
		match self {
			ResourceData::Payment(attrs) => Some(attrs),
			_ => None,
		}
	}

	pub fn as_review(&self) -> Option<&ReviewAttrs> {
		match self {
			ResourceData::Review(attrs) => Some(attrs),
			_ => None,
		}
	}
}

impl From<CourseAttrs> for ResourceData {
	fn from(attrs: CourseAttrs) -> Self {
		ResourceData::Course(attrs)
	}
}

impl From<EnrollmentAttrs> for ResourceData {
	fn from(attrs: EnrollmentAttrs) -> Self {
		ResourceData::Enrollment(attrs)
	}
}

impl From<AssignmentAttrs> for ResourceData {
	fn from(attrs: AssignmentAttrs) -> Self {
		ResourceData::Assignment(attrs)
	}
}

impl From<BlogAttrs> for ResourceData {
	fn from(attrs: BlogAttrs) -> Self {
		ResourceData::Blog(attrs)
	}
}

impl From<UserAttrs> for ResourceData {
	fn from(attrs: UserAttrs) -> Self {
		ResourceData::User(attrs)
	}
}

impl From<PaymentAttrs> for ResourceData {
	fn from(attrs: PaymentAttrs) -> Self {
		ResourceData::Payment(attrs)
	}
}

impl From<ReviewAttrs> for ResourceData {
	fn from(attrs: ReviewAttrs) -> Self {
		ResourceData::Review(attrs)
	}
}
