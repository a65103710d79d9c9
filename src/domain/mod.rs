mod bounded_text;
mod category;
mod currency;
mod frequency;
mod new_user;
mod password;
mod payment_method;
mod price;
mod reminder_plan;
mod renewal;
mod subscription;
mod subscription_name;
mod subscription_status;
mod user;
mod user_email;
mod user_name;

pub use category::Category;
pub use currency::Currency;
pub use frequency::Frequency;
pub use new_user::NewUser;
pub use password::Password;
pub use payment_method::PaymentMethod;
pub use price::Price;
pub use reminder_plan::{is_remindable, plan_reminders, ReminderStep, REMINDER_OFFSETS};
pub use renewal::{derive_renewal_and_status, RenewalInput};
pub use subscription::{Subscription, SubscriptionFields, ValidSubscription};
pub use subscription_name::{SubscriptionDescription, SubscriptionName};
pub use subscription_status::SubscriptionStatus;
pub use user::User;
pub use user_email::UserEmail;
pub use user_name::UserName;
