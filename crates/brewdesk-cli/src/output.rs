//! Plain-text rendering of backend records.
//!
//! Every function returns lines rather than printing, so the layout can be
//! checked without a terminal.

use brewdesk_core::models::{AdminProfile, Dashboard, DashboardStats, Order, Product};
use brewdesk_core::utils::{format_currency, format_date, format_datetime, format_optional, truncate_string};

const NAME_WIDTH: usize = 22;

pub fn stats_lines(stats: &DashboardStats) -> Vec<String> {
    vec![
        format!("Total orders:     {}", stats.total_orders),
        format!("Pending orders:   {}", stats.pending_orders),
        format!("Completed orders: {}", stats.completed_orders),
        format!("Total products:   {}", stats.total_products),
        format!("Total revenue:    {}", format_currency(stats.total_revenue)),
        format!(
            "Today:            {} orders, {}",
            stats.today_orders,
            format_currency(stats.today_revenue)
        ),
    ]
}

pub fn dashboard_lines(dashboard: &Dashboard) -> Vec<String> {
    let mut lines = stats_lines(&dashboard.stats);
    lines.push(String::new());
    lines.push("Recent orders".to_string());
    if dashboard.recent_orders.is_empty() {
        lines.push("  No orders yet".to_string());
    } else {
        lines.push(order_header());
        lines.extend(dashboard.recent_orders.iter().map(order_row));
    }
    lines
}

pub fn order_header() -> String {
    format!(
        "{:<6} {:<12} {:<w$} {:>10} {:<11} {:<9} {}",
        "ID",
        "Number",
        "Customer",
        "Total",
        "Status",
        "Payment",
        "Date",
        w = NAME_WIDTH
    )
}

pub fn order_row(order: &Order) -> String {
    format!(
        "{:<6} {:<12} {:<w$} {:>10} {:<11} {:<9} {}",
        order.id,
        order.order_number,
        truncate_string(&order.customer_name, NAME_WIDTH),
        format_currency(order.total_amount),
        order.status,
        order.payment_status,
        order.created_at.as_deref().map(format_date).unwrap_or_default(),
        w = NAME_WIDTH
    )
}

pub fn order_detail(order: &Order) -> Vec<String> {
    let mut lines = vec![
        format!("Order {} (#{})", order.order_number, order.id),
        format!("Customer: {}", order.customer_name),
        format!("Phone:    {}", order.phone_number),
        format!("Address:  {}", format_optional(&order.delivery_address, "-")),
        format!("Status:   {}", order.status),
        format!("Payment:  {}", order.payment_status),
        format!(
            "Placed:   {}",
            order.created_at.as_deref().map(format_datetime).unwrap_or_else(|| "-".to_string())
        ),
    ];
    if let Some(notes) = order.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("Notes:    {}", notes));
    }

    lines.push(String::new());
    for item in &order.items {
        lines.push(format!(
            "  {:>3} x {:<w$} {:>10}",
            item.quantity,
            truncate_string(&item.product_name, NAME_WIDTH),
            format_currency(item.line_total()),
            w = NAME_WIDTH
        ));
    }
    lines.push(format!("Total: {}", format_currency(order.total_amount)));
    if let Some(next) = order.status.next() {
        lines.push(format!("Next step: {}", next));
    }
    lines
}

pub fn product_header() -> String {
    format!(
        "{:<6} {:<w$} {:<14} {:>9} {:>6} {}",
        "ID",
        "Name",
        "Category",
        "Price",
        "Stock",
        "Availability",
        w = NAME_WIDTH
    )
}

pub fn product_row(product: &Product) -> String {
    format!(
        "{:<6} {:<w$} {:<14} {:>9} {:>6} {}",
        product.id,
        truncate_string(&product.name, NAME_WIDTH),
        truncate_string(product.category_display(), 14),
        format_currency(product.price),
        product.stock,
        product.availability_display(),
        w = NAME_WIDTH
    )
}

pub fn profile_lines(profile: &AdminProfile) -> Vec<String> {
    vec![
        format!("Name:         {}", profile.display_name()),
        format!("Email:        {}", format_optional(&profile.email, "-")),
        format!("Role:         {}", profile.role_display()),
        format!("Last login:   {}", profile.last_login_display()),
        format!("Member since: {}", profile.member_since_display()),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
