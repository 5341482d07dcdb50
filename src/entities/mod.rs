//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod complaint;
pub mod course;
pub mod crop;
pub mod education_content;
pub mod feedback;
pub mod ledger_entry;
pub mod lesson;
pub mod notification;
pub mod order;
pub mod status;
pub mod subsidy;
pub mod subsidy_application;
pub mod user;
pub mod verification;

// Re-export specific types to avoid conflicts
pub use complaint::{Entity as Complaint, Model as ComplaintModel};
pub use course::{Entity as Course, Model as CourseModel};
pub use crop::{Entity as Crop, Model as CropModel};
pub use education_content::{Entity as EducationContent, Model as EducationContentModel};
pub use feedback::{Entity as Feedback, Model as FeedbackModel};
pub use ledger_entry::{Entity as LedgerEntry, Model as LedgerEntryModel};
pub use lesson::{Entity as Lesson, Model as LessonModel};
pub use notification::{Entity as Notification, Model as NotificationModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use status::{
    ComplaintStatus, ContentType, CropStatus, OrderStatus, ReviewStatus, STOCK_EPSILON,
    VerificationStatus,
};
pub use subsidy::{Entity as Subsidy, Model as SubsidyModel};
pub use subsidy_application::{Entity as SubsidyApplication, Model as SubsidyApplicationModel};
pub use user::{Entity as User, Model as UserModel, Role};
pub use verification::{Entity as Verification, Model as VerificationModel};
