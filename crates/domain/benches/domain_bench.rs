use chrono::Utc;
use common::{OrderId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Cart, CheckoutInput, CheckoutLine, Money, Order, OrderNumber, PaymentMethod, Product,
    ProductId, ShippingAddress,
};

fn make_product(id: usize) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(format!("prod-{id}")),
        name: format!("Product {id}"),
        description: String::new(),
        price: Money::from_cents(500 + id as i64),
        list_price: None,
        category: "bench".to_string(),
        image: format!("prod-{id}.jpg"),
        stock: 10,
        rating: 0.0,
        reviews: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn make_checkout(lines: usize) -> CheckoutInput {
    CheckoutInput {
        user_id: UserId::new(),
        lines: (0..lines)
            .map(|i| CheckoutLine {
                product_id: ProductId::new(format!("prod-{i}")),
                name: format!("Product {i}"),
                unit_price: Money::from_cents(500 + i as i64),
                quantity: (i % 3 + 1) as u32,
                image: None,
            })
            .collect(),
        shipping_address: ShippingAddress {
            name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            street: "12 Lake Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "India".to_string(),
        },
        payment_method: PaymentMethod::Card,
        notes: None,
    }
}

fn bench_cart_totals(c: &mut Criterion) {
    let products: Vec<Product> = (0..100).map(make_product).collect();
    let mut cart = Cart::new();
    for product in &products {
        cart.add_item(product, 2);
    }

    c.bench_function("domain/cart_totals_100_lines", |b| {
        b.iter(|| cart.totals());
    });
}

fn bench_cart_add_merge(c: &mut Criterion) {
    let product = make_product(0);

    c.bench_function("domain/cart_add_same_product", |b| {
        b.iter(|| {
            let mut cart = Cart::new();
            for _ in 0..50 {
                cart.add_item(&product, 1);
            }
            cart
        });
    });
}

fn bench_checkout_validation(c: &mut Criterion) {
    let input = make_checkout(20);

    c.bench_function("domain/checkout_validate_20_lines", |b| {
        b.iter(|| input.validate().unwrap());
    });
}

fn bench_order_placement(c: &mut Criterion) {
    let input = make_checkout(20);

    c.bench_function("domain/order_place_20_lines", |b| {
        b.iter(|| Order::place(OrderId::new(), OrderNumber::generate(), &input, Utc::now()));
    });
}

fn bench_order_number(c: &mut Criterion) {
    c.bench_function("domain/order_number_generate", |b| {
        b.iter(OrderNumber::generate);
    });
}

criterion_group!(
    benches,
    bench_cart_totals,
    bench_cart_add_merge,
    bench_checkout_validation,
    bench_order_placement,
    bench_order_number
);
criterion_main!(benches);
