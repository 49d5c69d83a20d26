//! Bootstrap dataset written the first time a device store has no items.

use chrono::{DateTime, TimeZone, Utc};

use crate::model::{Chapter, ChapterPayload, ContentItem, ContentType, User, UserRole};

pub const STUDIO_AUTHOR: &str = "The Konbini Studio";

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn initial_content() -> Vec<ContentItem> {
    vec![
        ContentItem {
            id: "1".to_string(),
            title: "Thợ Săn Bóng Đêm".to_string(),
            description: "Trong một thế giới nơi bóng tối nuốt chửng ánh sáng, một thợ săn đơn độc đứng lên chống lại định mệnh.".to_string(),
            content_type: ContentType::Comic,
            cover_url: "https://picsum.photos/seed/comic1/600/800".to_string(),
            author: STUDIO_AUTHOR.to_string(),
            views: 12500,
            likes: Vec::new(),
            created_at: date(2023, 10, 1),
            tags: vec!["Hành động".to_string(), "Giả tưởng".to_string()],
            chapters: vec![Chapter {
                id: "c1-1".to_string(),
                title: "Chương 1: Sự khởi đầu".to_string(),
                payload: ChapterPayload::Pages {
                    pages: vec!["https://picsum.photos/seed/page1/800/1200".to_string()],
                },
                created_at: date(2023, 10, 1),
            }],
            status: Some("Hoàn thành".to_string()),
        },
        ContentItem {
            id: "2".to_string(),
            title: "Bí Mật Của Gió".to_string(),
            description: "Câu chuyện tình yêu nhẹ nhàng giữa lòng thành phố nhộn nhịp.".to_string(),
            content_type: ContentType::Novel,
            cover_url: "https://picsum.photos/seed/novel1/600/800".to_string(),
            author: "The Konbini Writers".to_string(),
            views: 5400,
            likes: Vec::new(),
            created_at: date(2023, 10, 5),
            tags: vec!["Lãng mạn".to_string(), "Đời thường".to_string()],
            chapters: vec![Chapter {
                id: "c2-1".to_string(),
                title: "Chương 1: Cơn gió lạ".to_string(),
                payload: ChapterPayload::Text {
                    content: "Buổi chiều hôm ấy, bầu trời Hà Nội trong vắt...".to_string(),
                },
                created_at: date(2023, 10, 5),
            }],
            status: Some("Đang cập nhật".to_string()),
        },
    ]
}

/// Accounts listed by the admin screen until a users collection is saved.
pub fn initial_users() -> Vec<User> {
    vec![User {
        id: "admin_01".to_string(),
        name: "The Konbini Admin".to_string(),
        email: None,
        avatar: "https://api.dicebear.com/7.x/identicon/svg?seed=admin".to_string(),
        bio: None,
        role: UserRole::Admin,
        is_anonymous: false,
        favorites: Vec::new(),
        reading_history: Vec::new(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_items_are_valid() {
        let items = initial_content();
        assert_eq!(items.len(), 2);
        for item in &items {
            item.validate().unwrap();
        }
    }

    #[test]
    fn seed_has_one_admin() {
        let users = initial_users();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());
        assert!(!users[0].is_anonymous);
    }
}
