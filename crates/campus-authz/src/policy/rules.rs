// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The built-in rule declarations.
//!
//! `SuperAdmin` has no entries here; its access comes from the evaluator
//! bypass. No `(role, resource, action)` triple currently carries more than
//! one conditional rule.

use crate::types::{Action, Resource, Role};

use super::conditions::*;
use super::PermissionRule;

use Action::*;

pub(super) fn builtin_rules() -> Vec<PermissionRule> {
	let mut rules = Vec::new();
	rules.extend(admin_rules());
	rules.extend(instructor_rules());
	rules.extend(student_rules());
	rules.extend(guest_rules());
	rules
}

fn admin_rules() -> Vec<PermissionRule> {
	let rule = |resource, actions: &[Action]| {
		PermissionRule::new(Role::Admin, resource, actions.iter().copied())
	};
	vec![
		rule(
			Resource::Course,
			&[Create, Read, Update, Delete, Publish, Approve, Export, Manage],
		),
		rule(Resource::Enrollment, &[Create, Read, Update, Delete, Export]),
		rule(Resource::Assignment, &[Create, Read, Update, Delete]),
		rule(
			Resource::Blog,
			&[Create, Read, Update, Delete, Publish, Approve],
		),
		rule(Resource::User, &[Create, Read, Export]),
		rule(Resource::User, &[Update, Delete]).when(IS_NOT_SELF),
		rule(Resource::AdminPanel, &[Read, Manage]),
		rule(Resource::Analytics, &[Read, Export]),
		rule(Resource::Settings, &[Read, Update]),
		rule(Resource::Payment, &[Read, Export]),
		rule(Resource::Review, &[Read, Update, Delete, Approve]),
	]
}

fn instructor_rules() -> Vec<PermissionRule> {
	let rule = |resource, actions: &[Action]| {
		PermissionRule::new(Role::Instructor, resource, actions.iter().copied())
	};
	vec![
		rule(Resource::Course, &[Create, Read]),
		rule(Resource::Course, &[Update, Delete, Publish]).when(OWNS_COURSE),
		rule(Resource::Enrollment, &[Read, Export]).when(TEACHES_ENROLLED_COURSE),
		rule(Resource::Assignment, &[Create, Read]),
		rule(Resource::Assignment, &[Update, Delete]).when(TEACHES_ASSIGNMENT_COURSE),
		rule(Resource::Blog, &[Create, Read]),
		rule(Resource::Blog, &[Update, Delete, Publish]).when(AUTHORED_BLOG),
		rule(Resource::User, &[Read]),
		rule(Resource::User, &[Update]).when(IS_SELF),
		rule(Resource::Analytics, &[Read]),
		rule(Resource::Review, &[Read]),
	]
}

fn student_rules() -> Vec<PermissionRule> {
	let rule = |resource, actions: &[Action]| {
		PermissionRule::new(Role::Student, resource, actions.iter().copied())
	};
	vec![
		rule(Resource::Course, &[Read]).when(COURSE_IS_PUBLISHED),
		rule(Resource::Enrollment, &[Create]),
		rule(Resource::Enrollment, &[Read, Delete]).when(IS_ENROLLEE),
		rule(Resource::Assignment, &[Read]),
		rule(Resource::Assignment, &[Update]).when(HAS_SUBMISSION),
		rule(Resource::Blog, &[Create]),
		rule(Resource::Blog, &[Read]).when(BLOG_IS_PUBLISHED),
		rule(Resource::Blog, &[Update, Delete]).when(AUTHORED_BLOG),
		rule(Resource::User, &[Read, Update]).when(IS_SELF),
		rule(Resource::Payment, &[Create]),
		rule(Resource::Payment, &[Read]).when(PAID_BY_SUBJECT),
		rule(Resource::Review, &[Create, Read]),
		rule(Resource::Review, &[Update, Delete]).when(WROTE_REVIEW),
	]
}

fn guest_rules() -> Vec<PermissionRule> {
	let rule = |resource, actions: &[Action]| {
		PermissionRule::new(Role::Guest, resource, actions.iter().copied())
	};
	vec![
		rule(Resource::Course, &[Read]).when(COURSE_IS_PUBLIC),
		rule(Resource::Blog, &[Read]).when(BLOG_IS_PUBLISHED),
		rule(Resource::Review, &[Read]).when(REVIEW_IS_PUBLISHED),
	]
}
