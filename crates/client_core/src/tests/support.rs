use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{Product, ProductId};
use tokio::sync::{Barrier, Notify};

use crate::api::ProductsApi;

/// In-memory stand-in for the product server.
#[derive(Default)]
pub(crate) struct FakeProductsApi {
    products: Mutex<Vec<Product>>,
    fail_list: Mutex<bool>,
    fail_create: Mutex<bool>,
    fail_update: Mutex<bool>,
    fail_delete: Mutex<HashSet<ProductId>>,
    forced_create_id: Mutex<Option<ProductId>>,
    create_candidates: Mutex<Vec<Product>>,
    delete_calls: Mutex<Vec<ProductId>>,
    delete_barrier: Mutex<Option<Arc<Barrier>>>,
    update_hold: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

pub(crate) fn fruit_basket() -> Vec<Product> {
    ["Apple", "Banana", "Cherry", "Date", "Egg", "Fig"]
        .iter()
        .enumerate()
        .map(|(idx, name)| Product::new(ProductId(idx as i64 + 1), *name))
        .collect()
}

impl FakeProductsApi {
    pub(crate) fn with_products(products: Vec<Product>) -> Arc<Self> {
        let api = Self::default();
        *api.products.lock().expect("lock") = products;
        Arc::new(api)
    }

    pub(crate) fn server_products(&self) -> Vec<Product> {
        self.products.lock().expect("lock").clone()
    }

    pub(crate) fn set_products(&self, products: Vec<Product>) {
        *self.products.lock().expect("lock") = products;
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        *self.fail_list.lock().expect("lock") = fail;
    }

    pub(crate) fn fail_create(&self, fail: bool) {
        *self.fail_create.lock().expect("lock") = fail;
    }

    pub(crate) fn fail_update(&self, fail: bool) {
        *self.fail_update.lock().expect("lock") = fail;
    }

    pub(crate) fn fail_delete_of(&self, id: ProductId) {
        self.fail_delete.lock().expect("lock").insert(id);
    }

    /// The next create answers with this id instead of a fresh one.
    pub(crate) fn force_create_id(&self, id: ProductId) {
        *self.forced_create_id.lock().expect("lock") = Some(id);
    }

    pub(crate) fn create_candidates(&self) -> Vec<Product> {
        self.create_candidates.lock().expect("lock").clone()
    }

    pub(crate) fn delete_calls(&self) -> Vec<ProductId> {
        self.delete_calls.lock().expect("lock").clone()
    }

    /// Every delete waits until `parties` deletes are in flight at once.
    pub(crate) fn require_concurrent_deletes(&self, parties: usize) {
        *self.delete_barrier.lock().expect("lock") = Some(Arc::new(Barrier::new(parties)));
    }

    /// Parks the next update after it is dispatched. The first notify fires
    /// once the update is parked; notifying the second releases it.
    pub(crate) fn hold_next_update(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.update_hold.lock().expect("lock") = Some((entered.clone(), release.clone()));
        (entered, release)
    }
}

#[async_trait]
impl ProductsApi for FakeProductsApi {
    async fn list_products(&self) -> Result<Vec<Product>> {
        if *self.fail_list.lock().expect("lock") {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.server_products())
    }

    async fn create_product(&self, candidate: &Product) -> Result<Product> {
        self.create_candidates
            .lock()
            .expect("lock")
            .push(candidate.clone());
        if *self.fail_create.lock().expect("lock") {
            return Err(anyhow!("server responded with 500 Internal Server Error"));
        }

        let forced = self.forced_create_id.lock().expect("lock").take();
        let mut products = self.products.lock().expect("lock");
        let id = forced.unwrap_or_else(|| {
            ProductId(products.iter().map(|p| p.id.0).max().unwrap_or(0) + 1)
        });
        let created = Product::new(id, candidate.name.clone());
        products.retain(|p| p.id != id);
        products.push(created.clone());
        Ok(created)
    }

    async fn update_product(&self, product: &Product) -> Result<Product> {
        let hold = self.update_hold.lock().expect("lock").take();
        if let Some((entered, release)) = hold {
            entered.notify_one();
            release.notified().await;
        }

        if *self.fail_update.lock().expect("lock") {
            return Err(anyhow!("server responded with 500 Internal Server Error"));
        }
        let mut products = self.products.lock().expect("lock");
        let existing = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| anyhow!("server responded with 404 Not Found"))?;
        existing.name = product.name.clone();
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.delete_calls.lock().expect("lock").push(id);
        let barrier = self.delete_barrier.lock().expect("lock").clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        if self.fail_delete.lock().expect("lock").contains(&id) {
            return Err(anyhow!("server responded with 404 Not Found"));
        }
        self.products.lock().expect("lock").retain(|p| p.id != id);
        Ok(())
    }
}
