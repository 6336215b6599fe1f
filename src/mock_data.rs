//! Static records used to seed the in-memory store and as the service client's
//! fallback when the API is unreachable.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    course::{Course, CourseModule, CourseStatus},
    newsletter::NewsletterSubscriber,
    progress::ModuleProgress,
    service::Service,
    settings::{SiteSettings, SocialLinks},
    student::{Student, StudentStatus},
    user::Role,
};

/// Demo accounts: (email, password, role).
pub const DEMO_ACCOUNTS: &[(&str, &str, Role)] = &[
    ("admin@thefringe.com", "admin123", Role::Admin),
    ("demo@thefringe.com", "demo123", Role::Admin),
    ("student@thefringe.com", "student123", Role::Student),
    ("john@example.com", "student123", Role::Student),
    ("demo@student.com", "demo123", Role::Student),
];

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn timestamp(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    date(y, m, d).and_hms_opt(9, 0, 0).unwrap_or_default().and_utc()
}

fn student(id: &str, name: &str, email: &str, course: &str, enrolled: NaiveDate, progress: i32, status: StudentStatus) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        course: course.to_string(),
        enrollment_date: enrolled,
        progress,
        status,
        certificate_url: None,
    }
}

pub fn students() -> Vec<Student> {
    vec![
        student("1", "Sarah Johnson", "sarah@example.com", "Professional Hair Styling", date(2024, 1, 15), 85, StudentStatus::Active),
        student("2", "Emily Chen", "emily@example.com", "Advanced Makeup Artistry", date(2024, 1, 10), 92, StudentStatus::Completed),
        student("3", "Jessica Miller", "jessica@example.com", "Nail Art & Design", date(2024, 1, 8), 45, StudentStatus::Active),
        student("4", "Amanda Rodriguez", "amanda@example.com", "Skin Care Specialist", date(2024, 1, 5), 67, StudentStatus::Paused),
        student("5", "John Doe", "john@example.com", "Professional Hair Styling", date(2024, 1, 1), 65, StudentStatus::Active),
        student("6", "Fringe Student", "student@thefringe.com", "Professional Hair Styling", date(2024, 2, 1), 0, StudentStatus::Active),
        student("7", "Demo Student", "demo@student.com", "Advanced Makeup Artistry", date(2024, 2, 3), 100, StudentStatus::Completed),
    ]
}

fn module(id: &str, title: &str, description: &str, duration: i32, video: &str, content: &str) -> CourseModule {
    CourseModule {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        duration,
        video_url: Some(video.to_string()),
        content: Some(content.to_string()),
    }
}

fn hair_styling_modules() -> Vec<CourseModule> {
    vec![
        module(
            "1",
            "Introduction to Hair Styling",
            "Learn the basics of hair structure, tools, and preparation techniques.",
            45,
            "/videos/intro-hair-styling.mp4",
            "Hair structure, different hair types, and the essential tools needed for professional styling.",
        ),
        module(
            "2",
            "Cutting Techniques",
            "Master fundamental cutting techniques and precision methods.",
            60,
            "/videos/cutting-techniques.mp4",
            "Layering, texturizing, and precision cutting methods used by professional stylists.",
        ),
        module(
            "3",
            "Color Theory and Application",
            "Understanding color theory and professional coloring techniques.",
            55,
            "/videos/color-theory.mp4",
            "Color theory, mixing techniques, and safe application methods for professional hair coloring.",
        ),
        module(
            "4",
            "Styling and Finishing",
            "Learn various styling methods and finishing techniques.",
            50,
            "/videos/styling-finishing.mp4",
            "Blow-drying, curling, straightening, and finishing touches for polished looks.",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn course(id: &str, title: &str, description: &str, duration: &str, price: i32, max: i32, current: i32, status: CourseStatus, instructor: &str, modules: Vec<CourseModule>) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        duration: duration.to_string(),
        price: Some(price),
        max_students: max,
        current_students: current,
        status,
        instructor: instructor.to_string(),
        modules,
    }
}

pub fn courses() -> Vec<Course> {
    vec![
        course(
            "1",
            "Professional Hair Styling",
            "Master the art of professional hair styling with cutting-edge techniques and industry best practices.",
            "8 weeks",
            799,
            15,
            12,
            CourseStatus::Active,
            "Maria Rodriguez",
            hair_styling_modules(),
        ),
        course(
            "2",
            "Advanced Makeup Artistry",
            "Professional makeup techniques for bridal, fashion, and theatrical makeup.",
            "10 weeks",
            899,
            12,
            8,
            CourseStatus::Active,
            "Sarah Johnson",
            Vec::new(),
        ),
        course(
            "3",
            "Nail Art & Design",
            "Creative nail art from basic to advanced techniques including gel, acrylic, and decorative designs.",
            "6 weeks",
            599,
            20,
            0,
            CourseStatus::Draft,
            "Lisa Chen",
            Vec::new(),
        ),
        course(
            "4",
            "Skin Care Specialist",
            "Facial treatments, product knowledge, and skin analysis.",
            "12 weeks",
            1299,
            10,
            5,
            CourseStatus::Active,
            "Dr. Emily White",
            Vec::new(),
        ),
    ]
}

fn service(id: &str, title: &str, description: &str, duration: &str, price: i32, category: &str) -> Service {
    Service {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        price: Some(price),
        duration: Some(duration.to_string()),
        image: None,
        is_active: true,
    }
}

pub fn services() -> Vec<Service> {
    vec![
        service("1", "Professional Haircut", "Expert haircut with styling consultation and finishing", "60 minutes", 75, "Hair"),
        service("2", "Bridal Makeup", "Complete bridal makeup package with trial session", "120 minutes", 200, "Bridal"),
        service("3", "Gel Manicure", "Long-lasting gel manicure with nail art options", "45 minutes", 35, "Nails"),
        service("4", "Facial Treatment", "Deep cleansing facial with customized skin care", "90 minutes", 110, "Skin Care"),
    ]
}

pub fn subscribers() -> Vec<NewsletterSubscriber> {
    [
        ("1", "sarah@example.com", timestamp(2024, 1, 15)),
        ("2", "emily@example.com", timestamp(2024, 1, 10)),
        ("3", "jessica@example.com", timestamp(2024, 1, 8)),
        ("4", "amanda@example.com", timestamp(2024, 1, 5)),
        ("5", "maria@example.com", timestamp(2024, 1, 3)),
    ]
    .into_iter()
    .map(|(id, email, at)| NewsletterSubscriber {
        id: id.to_string(),
        email: email.to_string(),
        name: None,
        is_active: true,
        subscribed_at: at,
        unsubscribed_at: None,
    })
    .collect()
}

pub fn settings() -> SiteSettings {
    SiteSettings {
        show_prices: true,
        site_name: "The Fringe Beauty Academy".to_string(),
        contact_email: "info@thefringe.com".to_string(),
        contact_phone: "+1 (555) 123-4567".to_string(),
        address: "123 Beauty Street, City, State 12345".to_string(),
        social_media: SocialLinks {
            facebook: Some("https://facebook.com/thefringe".to_string()),
            instagram: Some("https://instagram.com/thefringe".to_string()),
            twitter: Some("https://twitter.com/thefringe".to_string()),
        },
        updated_at: timestamp(2024, 1, 1),
    }
}

/// Watch history of the seeded `john@example.com` account: two modules done, the
/// third paused at 20 minutes.
pub fn module_progress() -> Vec<(String, ModuleProgress)> {
    let at = timestamp(2024, 1, 20);
    let entry = |module_id: &str, progress: f64, position: f64, completed: bool| {
        (
            "john@example.com".to_string(),
            ModuleProgress {
                module_id: module_id.to_string(),
                progress,
                last_position: position,
                completed,
                updated_at: at,
            },
        )
    };

    vec![
        entry("1", 100.0, 0.0, true),
        entry("2", 100.0, 0.0, true),
        entry("3", 60.0, 1200.0, false),
    ]
}
