//! Query filters shared by the MongoDB and in-memory repositories.
//!
//! Each filter renders to a MongoDB document and can be evaluated directly
//! against an entity, so both backends answer the same question.

use mongodb::bson::{doc, Document};

use crate::models::domain::{Course, Homework, Solution, User, UserRole};

#[derive(Debug, Clone, PartialEq)]
pub enum UserFilter {
    Role(UserRole),
    /// Users of `role` whose id is in the list.
    RoleAmong(UserRole, Vec<String>),
}

impl UserFilter {
    pub fn to_document(&self) -> Document {
        match self {
            UserFilter::Role(role) => doc! { "role": role.as_str() },
            UserFilter::RoleAmong(role, ids) => doc! {
                "role": role.as_str(),
                "id": { "$in": ids.clone() },
            },
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::Role(role) => user.role == *role,
            UserFilter::RoleAmong(role, ids) => user.role == *role && ids.contains(&user.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CourseFilter {
    All,
    WithStudent(String),
}

impl CourseFilter {
    pub fn to_document(&self) -> Document {
        match self {
            CourseFilter::All => doc! {},
            CourseFilter::WithStudent(student_id) => doc! { "student_ids": student_id },
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        match self {
            CourseFilter::All => true,
            CourseFilter::WithStudent(student_id) => course.has_student(student_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HomeworkFilter {
    Course(String),
    AssignedTo(String),
}

impl HomeworkFilter {
    pub fn to_document(&self) -> Document {
        match self {
            HomeworkFilter::Course(course_id) => doc! { "course_id": course_id },
            HomeworkFilter::AssignedTo(student_id) => doc! { "student_ids": student_id },
        }
    }

    pub fn matches(&self, homework: &Homework) -> bool {
        match self {
            HomeworkFilter::Course(course_id) => homework.course_id == *course_id,
            HomeworkFilter::AssignedTo(student_id) => homework.has_student(student_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolutionFilter {
    Homework(String),
    HomeworkAndStudent { homework_id: String, student_id: String },
}

impl SolutionFilter {
    pub fn to_document(&self) -> Document {
        match self {
            SolutionFilter::Homework(homework_id) => doc! { "homework_id": homework_id },
            SolutionFilter::HomeworkAndStudent {
                homework_id,
                student_id,
            } => doc! { "homework_id": homework_id, "student_id": student_id },
        }
    }

    pub fn matches(&self, solution: &Solution) -> bool {
        match self {
            SolutionFilter::Homework(homework_id) => solution.homework_id == *homework_id,
            SolutionFilter::HomeworkAndStudent {
                homework_id,
                student_id,
            } => solution.homework_id == *homework_id && solution.student_id == *student_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_filter_document_and_match() {
        let student = User::new(UserRole::Student, "s", "s", "hash".to_string());
        let teacher = User::new(UserRole::Teacher, "t", "t", "hash".to_string());

        let by_role = UserFilter::Role(UserRole::Student);
        assert_eq!(by_role.to_document(), doc! { "role": "student" });
        assert!(by_role.matches(&student));
        assert!(!by_role.matches(&teacher));

        let among = UserFilter::RoleAmong(UserRole::Student, vec![teacher.id.clone()]);
        assert!(!among.matches(&student));
        assert!(!among.matches(&teacher));
    }

    #[test]
    fn test_course_filter_with_student() {
        let mut course = Course::new("c", "d", "t1");
        course.student_ids.push("s1".to_string());

        assert!(CourseFilter::All.matches(&course));
        assert!(CourseFilter::WithStudent("s1".to_string()).matches(&course));
        assert!(!CourseFilter::WithStudent("s2".to_string()).matches(&course));
        assert_eq!(
            CourseFilter::WithStudent("s1".to_string()).to_document(),
            doc! { "student_ids": "s1" }
        );
    }

    #[test]
    fn test_solution_filter_scopes_to_student() {
        let solution = Solution::new("h1", "s1", "/tmp/file");
        let own = SolutionFilter::HomeworkAndStudent {
            homework_id: "h1".to_string(),
            student_id: "s1".to_string(),
        };
        let other = SolutionFilter::HomeworkAndStudent {
            homework_id: "h1".to_string(),
            student_id: "s2".to_string(),
        };

        assert!(SolutionFilter::Homework("h1".to_string()).matches(&solution));
        assert!(own.matches(&solution));
        assert!(!other.matches(&solution));
    }
}
