// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Instance-level predicates used by the built-in policy table.
//!
//! Each predicate reads only the attributes of its own resource kind and
//! returns `None` when the payload is of another kind or lacks a field, so a
//! missing attribute can never widen access.

use crate::resource::{ContentStatus, ResourceData};
use crate::types::Subject;

use super::Condition;

pub const OWNS_COURSE: Condition = Condition::new("owns_course", owns_course);
pub const COURSE_IS_PUBLIC: Condition = Condition::new("course_is_public", course_is_public);
pub const COURSE_IS_PUBLISHED: Condition =
	Condition::new("course_is_published", course_is_published);
pub const TEACHES_ENROLLED_COURSE: Condition =
	Condition::new("teaches_enrolled_course", teaches_enrolled_course);
pub const IS_ENROLLEE: Condition = Condition::new("is_enrollee", is_enrollee);
pub const TEACHES_ASSIGNMENT_COURSE: Condition =
	Condition::new("teaches_assignment_course", teaches_assignment_course);
pub const HAS_SUBMISSION: Condition = Condition::new("has_submission", has_submission);
pub const AUTHORED_BLOG: Condition = Condition::new("authored_blog", authored_blog);
pub const BLOG_IS_PUBLISHED: Condition = Condition::new("blog_is_published", blog_is_published);
pub const IS_SELF: Condition = Condition::new("is_self", is_self);
pub const IS_NOT_SELF: Condition = Condition::new("is_not_self", is_not_self);
pub const PAID_BY_SUBJECT: Condition = Condition::new("paid_by_subject", paid_by_subject);
pub const WROTE_REVIEW: Condition = Condition::new("wrote_review", wrote_review);
pub const REVIEW_IS_PUBLISHED: Condition =
	Condition::new("review_is_published", review_is_published);

fn owns_course(subject: &Subject, data: &ResourceData) -> Option<bool> {
	let instructor = data.as_course()?.instructor_id.as_ref()?;
	Some(subject.is(instructor))
}

fn course_is_public(_subject: &Subject, data: &ResourceData) -> Option<bool> {
	data.as_course()?.is_public
}

fn course_is_published(_subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(data.as_course()?.status? == ContentStatus::Published)
}

fn teaches_enrolled_course(subject: &Subject, data: &ResourceData) -> Option<bool> {
	let course = data.as_enrollment()?.course.as_ref()?;
	Some(subject.is(course.instructor_id.as_ref()?))
}

fn is_enrollee(subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(subject.is(data.as_enrollment()?.user_id.as_ref()?))
}

fn teaches_assignment_course(subject: &Subject, data: &ResourceData) -> Option<bool> {
	let course = data.as_assignment()?.course.as_ref()?;
	Some(subject.is(course.instructor_id.as_ref()?))
}

fn has_submission(subject: &Subject, data: &ResourceData) -> Option<bool> {
	let assignment = data.as_assignment()?;
	Some(
		assignment
			.submissions
			.iter()
			.filter_map(|s| s.user_id.as_ref())
			.any(|id| subject.is(id)),
	)
}

fn authored_blog(subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(subject.is(data.as_blog()?.author_id.as_ref()?))
}

fn blog_is_published(_subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(data.as_blog()?.status? == ContentStatus::Published)
}

fn is_self(subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(subject.is(data.as_user()?.id.as_ref()?))
}

// Administrators may not modify their own account.
fn is_not_self(subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(!subject.is(data.as_user()?.id.as_ref()?))
}

fn paid_by_subject(subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(subject.is(data.as_payment()?.user_id.as_ref()?))
}

fn wrote_review(subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(subject.is(data.as_review()?.user_id.as_ref()?))
}

fn review_is_published(_subject: &Subject, data: &ResourceData) -> Option<bool> {
	Some(data.as_review()?.status? == ContentStatus::Published)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resource::{
		AssignmentAttrs, BlogAttrs, CourseAttrs, CourseRef, EnrollmentAttrs, UserAttrs,
	};
	use crate::types::Role;

	fn instructor(id: &str) -> Subject {
		Subject::new(id, Role::Instructor)
	}

	#[test]
	fn owns_course_compares_instructor_id() {
		let data = CourseAttrs::default().with_instructor("u1").into();
		assert_eq!(OWNS_COURSE.test(&instructor("u1"), &data), Some(true));
		assert_eq!(OWNS_COURSE.test(&instructor("u2"), &data), Some(false));
	}

	#[test]
	fn missing_attribute_yields_none() {
		let data = CourseAttrs::default().into();
		assert_eq!(OWNS_COURSE.test(&instructor("u1"), &data), None);
		assert_eq!(COURSE_IS_PUBLIC.test(&Subject::guest(), &data), None);
		assert_eq!(COURSE_IS_PUBLISHED.test(&Subject::guest(), &data), None);
	}

	#[test]
	fn mismatched_resource_kind_yields_none() {
		let data = BlogAttrs::default().with_author("u1").into();
		assert_eq!(OWNS_COURSE.test(&instructor("u1"), &data), None);
		assert_eq!(IS_SELF.test(&instructor("u1"), &data), None);
	}

	#[test]
	fn nested_course_reference_is_read() {
		let enrollment = EnrollmentAttrs::default()
			.with_user("s1")
			.with_course(CourseRef::taught_by("u1"))
			.into();
		assert_eq!(
			TEACHES_ENROLLED_COURSE.test(&instructor("u1"), &enrollment),
			Some(true)
		);
		assert_eq!(
			IS_ENROLLEE.test(&Subject::new("s1", Role::Student), &enrollment),
			Some(true)
		);
	}

	#[test]
	fn has_submission_scans_all_entries() {
		let data = AssignmentAttrs::default()
			.with_submission("s1")
			.with_submission("s2")
			.into();
		let s2 = Subject::new("s2", Role::Student);
		let s3 = Subject::new("s3", Role::Student);
		assert_eq!(HAS_SUBMISSION.test(&s2, &data), Some(true));
		assert_eq!(HAS_SUBMISSION.test(&s3, &data), Some(false));
	}

	#[test]
	fn self_checks_are_complementary() {
		let data = UserAttrs::new("u1").into();
		let admin = Subject::new("u1", Role::Admin);
		assert_eq!(IS_SELF.test(&admin, &data), Some(true));
		assert_eq!(IS_NOT_SELF.test(&admin, &data), Some(false));
	}

	#[test]
	fn published_checks_require_exact_status() {
		let draft = BlogAttrs::default().with_status(ContentStatus::Draft).into();
		let live = BlogAttrs::default()
			.with_status(ContentStatus::Published)
			.into();
		assert_eq!(BLOG_IS_PUBLISHED.test(&Subject::guest(), &draft), Some(false));
		assert_eq!(BLOG_IS_PUBLISHED.test(&Subject::guest(), &live), Some(true));
	}
}
