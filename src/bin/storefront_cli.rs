use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use storefront_api::{
    client::{StorefrontClient, DEFAULT_BASE_URL},
    services::{
        accounts::AuthResponse, cart::CartLine, catalog::ProductQuery, catalog::ProductView,
        orders::OrderView, wishlist::WishlistEntry,
    },
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut client = StorefrontClient::new(&cli.base_url).context("failed to build HTTP client")?;
    if let Some(token) = cli.token.clone() {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Auth(command) => handle_auth_command(&client, command, cli.json).await?,
        Commands::Products(command) => {
            handle_products_command(&client, command, cli.json).await?
        }
        Commands::Categories => handle_categories(&client, cli.json).await?,
        Commands::Cart(command) => handle_cart_command(&client, command, cli.json).await?,
        Commands::Orders(command) => handle_orders_command(&client, command, cli.json).await?,
        Commands::Wishlist(command) => {
            handle_wishlist_command(&client, command, cli.json).await?
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "storefront", about = "Storefront CLI for browsing and shopping", version)]
struct Cli {
    #[arg(long, global = true, env = "STOREFRONT_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(
        long,
        global = true,
        env = "STOREFRONT_TOKEN",
        help = "Bearer token from `auth login`"
    )]
    token: Option<String>,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Auth(AuthCommands),
    #[command(subcommand)]
    Products(ProductsCommands),
    /// List categories
    Categories,
    #[command(subcommand)]
    Cart(CartCommands),
    #[command(subcommand)]
    Orders(OrdersCommands),
    #[command(subcommand)]
    Wishlist(WishlistCommands),
}

#[derive(Subcommand)]
enum AuthCommands {
    Register(RegisterArgs),
    Login(LoginArgs),
    /// Show the signed-in user
    Me,
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Subcommand)]
enum ProductsCommands {
    List(ProductListArgs),
    Get {
        #[arg(value_parser = clap::value_parser!(Uuid))]
        id: Uuid,
    },
}

#[derive(Args)]
struct ProductListArgs {
    #[arg(long, help = "Category slug")]
    category: Option<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, help = "id, name, price, rating or created_at")]
    sort: Option<String>,
    #[arg(long, help = "ASC or DESC")]
    order: Option<String>,
}

#[derive(Subcommand)]
enum CartCommands {
    List,
    Add {
        product_id: Uuid,
        #[arg(long, default_value_t = 1)]
        quantity: i32,
    },
    Update {
        item_id: Uuid,
        quantity: i32,
    },
    Remove {
        item_id: Uuid,
    },
    Clear,
}

#[derive(Subcommand)]
enum OrdersCommands {
    List,
    Get {
        id: Uuid,
    },
    /// Place an order from the current cart
    Place {
        #[arg(long, help = "Shipping address as a JSON object")]
        address: String,
    },
}

#[derive(Subcommand)]
enum WishlistCommands {
    List,
    Add { product_id: Uuid },
    Remove { item_id: Uuid },
    Check { product_id: Uuid },
}

async fn handle_auth_command(
    client: &StorefrontClient,
    command: AuthCommands,
    json: bool,
) -> Result<()> {
    match command {
        AuthCommands::Register(args) => {
            let response = client
                .register(&args.name, &args.email, &args.password)
                .await
                .context("registration failed")?;
            render_auth(&response, json)
        }
        AuthCommands::Login(args) => {
            let response = client
                .login(&args.email, &args.password)
                .await
                .context("login failed")?;
            render_auth(&response, json)
        }
        AuthCommands::Me => {
            let me = client.me().await.context("failed to load current user")?;
            if json {
                print_json(&me)
            } else {
                println!("{} <{}> (id {})", me.user.name, me.user.email, me.user.id);
                Ok(())
            }
        }
    }
}

async fn handle_products_command(
    client: &StorefrontClient,
    command: ProductsCommands,
    json: bool,
) -> Result<()> {
    match command {
        ProductsCommands::List(args) => {
            let query = ProductQuery {
                category: args.category,
                search: args.search,
                sort: args.sort,
                order: args.order,
            };
            let products = client.products(&query).await.context("failed to list products")?;
            if json {
                return print_json(&products);
            }
            if products.is_empty() {
                println!("No products found");
            }
            products.iter().for_each(render_product);
            Ok(())
        }
        ProductsCommands::Get { id } => {
            let product = client.product(id).await.context("failed to load product")?;
            if json {
                print_json(&product)
            } else {
                render_product(&product);
                if let Some(description) = &product.description {
                    println!("  {}", description);
                }
                Ok(())
            }
        }
    }
}

async fn handle_categories(client: &StorefrontClient, json: bool) -> Result<()> {
    let categories = client
        .categories()
        .await
        .context("failed to list categories")?;
    if json {
        return print_json(&categories);
    }
    for category in &categories {
        println!("- {} ({}) • {}", category.name, category.slug, category.id);
    }
    Ok(())
}

async fn handle_cart_command(
    client: &StorefrontClient,
    command: CartCommands,
    json: bool,
) -> Result<()> {
    match command {
        CartCommands::List => {
            let lines = client.cart().await.context("failed to load cart")?;
            if json {
                return print_json(&lines);
            }
            if lines.is_empty() {
                println!("Cart is empty");
            }
            lines.iter().for_each(render_cart_line);
            let count: i64 = lines.iter().map(|l| i64::from(l.quantity)).sum();
            println!("{} item(s)", count);
            Ok(())
        }
        CartCommands::Add {
            product_id,
            quantity,
        } => {
            let item = client
                .add_to_cart(product_id, quantity)
                .await
                .context("failed to add to cart")?;
            if json {
                print_json(&item)
            } else {
                println!("Cart item {} now has quantity {}", item.id, item.quantity);
                Ok(())
            }
        }
        CartCommands::Update { item_id, quantity } => {
            let item = client
                .update_cart_item(item_id, quantity)
                .await
                .context("failed to update cart item")?;
            if json {
                print_json(&item)
            } else {
                println!("Cart item {} now has quantity {}", item.id, item.quantity);
                Ok(())
            }
        }
        CartCommands::Remove { item_id } => {
            let response = client
                .remove_from_cart(item_id)
                .await
                .context("failed to remove cart item")?;
            render_message(&response, &response.message, json)
        }
        CartCommands::Clear => {
            let response = client.clear_cart().await.context("failed to clear cart")?;
            render_message(&response, &response.message, json)
        }
    }
}

async fn handle_orders_command(
    client: &StorefrontClient,
    command: OrdersCommands,
    json: bool,
) -> Result<()> {
    match command {
        OrdersCommands::List => {
            let orders = client.orders().await.context("failed to list orders")?;
            if json {
                return print_json(&orders);
            }
            if orders.is_empty() {
                println!("No orders yet");
            }
            orders.iter().for_each(render_order);
            Ok(())
        }
        OrdersCommands::Get { id } => {
            let order = client.order(id).await.context("failed to load order")?;
            if json {
                print_json(&order)
            } else {
                render_order(&order);
                Ok(())
            }
        }
        OrdersCommands::Place { address } => {
            let shipping_address: serde_json::Value =
                serde_json::from_str(&address).context("--address must be valid JSON")?;
            let order = client
                .place_order(shipping_address)
                .await
                .context("failed to place order")?;
            if json {
                print_json(&order)
            } else {
                println!("Order placed");
                render_order(&order);
                Ok(())
            }
        }
    }
}

async fn handle_wishlist_command(
    client: &StorefrontClient,
    command: WishlistCommands,
    json: bool,
) -> Result<()> {
    match command {
        WishlistCommands::List => {
            let entries = client.wishlist().await.context("failed to load wishlist")?;
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("Wishlist is empty");
            }
            entries.iter().for_each(render_wishlist_entry);
            Ok(())
        }
        WishlistCommands::Add { product_id } => {
            let item = client
                .add_to_wishlist(product_id)
                .await
                .context("failed to add to wishlist")?;
            if json {
                print_json(&item)
            } else {
                println!("Saved as wishlist item {}", item.id);
                Ok(())
            }
        }
        WishlistCommands::Remove { item_id } => {
            let response = client
                .remove_from_wishlist(item_id)
                .await
                .context("failed to remove wishlist item")?;
            render_message(&response, &response.message, json)
        }
        WishlistCommands::Check { product_id } => {
            let in_wishlist = client
                .check_wishlist(product_id)
                .await
                .context("failed to check wishlist")?;
            if json {
                print_json(&serde_json::json!({ "inWishlist": in_wishlist }))
            } else {
                println!("{}", if in_wishlist { "In wishlist" } else { "Not in wishlist" });
                Ok(())
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_message<T: Serialize>(value: &T, message: &str, json: bool) -> Result<()> {
    if json {
        print_json(value)
    } else {
        println!("{}", message);
        Ok(())
    }
}

fn render_auth(response: &AuthResponse, json: bool) -> Result<()> {
    if json {
        return print_json(response);
    }
    println!(
        "{} • {} <{}> (id {})",
        response.message, response.user.name, response.user.email, response.user.id
    );
    println!("export STOREFRONT_TOKEN={}", response.token);
    Ok(())
}

fn render_product(product: &ProductView) {
    println!(
        "- {} • {} • price {} • stock {} • {}",
        product.id,
        product.name,
        product.price,
        product.stock,
        product.category_name.as_deref().unwrap_or("uncategorized")
    );
}

fn render_cart_line(line: &CartLine) {
    println!(
        "- {} • {} × {} @ {}",
        line.id, line.quantity, line.name, line.price
    );
}

fn render_order(order: &OrderView) {
    println!(
        "- Order {} ({}) • status {} • total {} • {} item(s)",
        order.order_number,
        order.id,
        serde_json::to_value(order.status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        order.total_amount,
        order.items.len()
    );
    for item in &order.items {
        println!(
            "    {} × {} @ {} = {}",
            item.quantity, item.product_name, item.product_price, item.subtotal
        );
    }
}

fn render_wishlist_entry(entry: &WishlistEntry) {
    println!(
        "- {} • {} • price {}",
        entry.id, entry.product.name, entry.product.price
    );
}
