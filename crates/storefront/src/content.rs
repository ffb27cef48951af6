//! Static storefront content: departments and account menu.
//!
//! Categories are the backend's slugs (`mens-shirts`); [`format_category`]
//! turns them into display text.

/// A department and the backend categories it groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Department {
    pub slug: &'static str,
    pub title: &'static str,
    pub categories: &'static [&'static str],
}

/// A tile on the account page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountOption {
    pub title: &'static str,
    pub text: &'static str,
    /// Where the tile leads, if that section exists.
    pub href: Option<&'static str>,
}

pub const DEPARTMENTS: &[Department] = &[
    Department {
        slug: "electronics",
        title: "Electronics",
        categories: &["smartphones", "laptops", "tablets", "mobile-accessories"],
    },
    Department {
        slug: "beauty",
        title: "Beauty & Personal Care",
        categories: &["beauty", "fragrances", "skin-care"],
    },
    Department {
        slug: "home",
        title: "Home & Kitchen",
        categories: &["furniture", "home-decoration", "kitchen-accessories", "groceries"],
    },
    Department {
        slug: "mens-fashion",
        title: "Men's Fashion",
        categories: &["mens-shirts", "mens-shoes", "mens-watches"],
    },
    Department {
        slug: "womens-fashion",
        title: "Women's Fashion",
        categories: &[
            "tops",
            "womens-dresses",
            "womens-shoes",
            "womens-bags",
            "womens-jewellery",
            "womens-watches",
        ],
    },
    Department {
        slug: "sports-outdoors",
        title: "Sports & Outdoors",
        categories: &["sports-accessories", "sunglasses"],
    },
    Department {
        slug: "automotive",
        title: "Automotive",
        categories: &["motorcycle", "vehicle"],
    },
];

pub const ACCOUNT_OPTIONS: &[AccountOption] = &[
    AccountOption {
        title: "Your Orders",
        text: "Track, return, cancel an order, download invoice or buy again",
        href: None,
    },
    AccountOption {
        title: "Login & Security",
        text: "Manage password, email and mobile number",
        href: None,
    },
    AccountOption {
        title: "Your Addresses",
        text: "Edit, remove or set default address",
        href: Some("/account/addresses"),
    },
    AccountOption {
        title: "Your Payments",
        text: "Manage or add payment methods, and view your transactions",
        href: None,
    },
    AccountOption {
        title: "Gift Cards & Top Up",
        text: "View balance or redeem a card and purchase a new gift card",
        href: None,
    },
    AccountOption {
        title: "Your Messages",
        text: "View or respond to messages from Scamazon, Sellers and Buyers",
        href: None,
    },
    AccountOption {
        title: "Customer Service",
        text: "Browse self service options, help articles or contact us",
        href: None,
    },
];

/// Look up a department by slug.
#[must_use]
pub fn department(slug: &str) -> Option<&'static Department> {
    DEPARTMENTS.iter().find(|department| department.slug == slug)
}

/// The department a category belongs to.
#[must_use]
pub fn department_of(category: &str) -> Option<&'static Department> {
    DEPARTMENTS
        .iter()
        .find(|department| department.categories.contains(&category))
}

/// `"mens-shirts"` → `"Mens Shirts"`.
#[must_use]
pub fn format_category(category: &str) -> String {
    category
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_category() {
        assert_eq!(format_category("mens-shirts"), "Mens Shirts");
        assert_eq!(format_category("laptops"), "Laptops");
        assert_eq!(format_category("home--decoration"), "Home Decoration");
        assert_eq!(format_category(""), "");
    }

    #[test]
    fn test_department_of() {
        assert_eq!(department_of("laptops").map(|d| d.slug), Some("electronics"));
        assert!(department_of("spaceships").is_none());
    }

    #[test]
    fn test_every_category_has_one_department() {
        let mut seen = std::collections::HashSet::new();
        for department in DEPARTMENTS {
            for category in department.categories {
                assert!(seen.insert(*category), "{category} listed twice");
            }
        }
    }

    #[test]
    fn test_addresses_tile_links() {
        assert!(
            ACCOUNT_OPTIONS
                .iter()
                .any(|option| option.href == Some("/account/addresses"))
        );
    }
}
