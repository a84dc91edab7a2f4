use actix_web::HttpResponse;

use crate::models::imports::TemplateFormat;
use crate::services::imports::build_template;

const HEADERS: [&str; 6] = ["name", "email", "phone", "subject", "hired_on", "status"];

const EXAMPLE: [&str; 6] = [
    "Budi Santoso",
    "budi.santoso@example.com",
    "+62 811-0000-1111",
    "Mathematics",
    "2023-07-15",
    "active",
];

pub fn download_template(format: TemplateFormat) -> HttpResponse {
    build_template(format, &HEADERS, &EXAMPLE, "teachers")
}
