//! Deterministic CBOR encoding of transaction bodies.
//!
//! Encode-only: the engine needs the serialized body for exactly two things,
//! the body hash (tx id) and the byte length feeding the fee floor. All
//! collections in the body are ordered, so encoding is canonical without a
//! sorting pass.

use minicbor::encode::{Error, Write};
use minicbor::{Encode, Encoder};

use crate::{
    tx::{Addr, Cert, PoolParams, TxBody, TxIn, TxOut},
    Ptr, UnitInterval,
};

pub fn body_bytes(body: &TxBody) -> Vec<u8> {
    minicbor::to_vec(body).unwrap()
}

impl<C> Encode<C> for TxIn {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), Error<W::Error>> {
        e.array(2)?;
        e.bytes(self.tx.as_ref())?;
        e.u32(self.index)?;

        Ok(())
    }
}

impl<C> Encode<C> for Ptr {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), Error<W::Error>> {
        e.array(3)?;
        e.u64(self.slot)?;
        e.u32(self.tx_ix)?;
        e.u32(self.cert_ix)?;

        Ok(())
    }
}

impl<C> Encode<C> for Addr {
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        match self {
            Addr::Key { payment, stake } => {
                e.array(3)?;
                e.u8(0)?;
                e.bytes(payment.as_ref())?;
                e.bytes(stake.as_ref())?;
            }
            Addr::Ptr(ptr) => {
                e.array(2)?;
                e.u8(1)?;
                ptr.encode(e, ctx)?;
            }
        }

        Ok(())
    }
}

impl<C> Encode<C> for TxOut {
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.array(2)?;
        self.addr.encode(e, ctx)?;
        e.u64(self.coin)?;

        Ok(())
    }
}

impl<C> Encode<C> for UnitInterval {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), Error<W::Error>> {
        e.array(2)?;
        e.u64(self.numerator())?;
        e.u64(self.denominator())?;

        Ok(())
    }
}

impl<C> Encode<C> for PoolParams {
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.array(6)?;
        e.bytes(self.operator.as_ref())?;
        e.u64(self.pledge)?;
        e.u64(self.cost)?;
        self.margin.encode(e, ctx)?;
        e.bytes(self.reward_account.0.as_ref())?;

        e.array(self.owners.len() as u64)?;
        for owner in &self.owners {
            e.bytes(owner.as_ref())?;
        }

        Ok(())
    }
}

impl<C> Encode<C> for Cert {
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        match self {
            Cert::RegKey(k) => {
                e.array(2)?;
                e.u8(0)?;
                e.bytes(k.as_ref())?;
            }
            Cert::DeRegKey(k) => {
                e.array(2)?;
                e.u8(1)?;
                e.bytes(k.as_ref())?;
            }
            Cert::Delegate { delegator, pool } => {
                e.array(3)?;
                e.u8(2)?;
                e.bytes(delegator.as_ref())?;
                e.bytes(pool.as_ref())?;
            }
            Cert::RegPool(params) => {
                e.array(2)?;
                e.u8(3)?;
                params.encode(e, ctx)?;
            }
            Cert::RetirePool { pool, epoch } => {
                e.array(3)?;
                e.u8(4)?;
                e.bytes(pool.as_ref())?;
                e.u64(*epoch)?;
            }
        }

        Ok(())
    }
}

impl<C> Encode<C> for TxBody {
    fn encode<W: Write>(&self, e: &mut Encoder<W>, ctx: &mut C) -> Result<(), Error<W::Error>> {
        e.array(7)?;

        e.array(self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.encode(e, ctx)?;
        }

        e.array(self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.encode(e, ctx)?;
        }

        e.array(self.certs.len() as u64)?;
        for cert in &self.certs {
            cert.encode(e, ctx)?;
        }

        e.map(self.withdrawals.len() as u64)?;
        for (account, amount) in &self.withdrawals {
            e.bytes(account.0.as_ref())?;
            e.u64(*amount)?;
        }

        e.u64(self.fee)?;
        e.u64(self.ttl)?;

        e.map(self.entropy.len() as u64)?;
        for (genesis, seed) in &self.entropy {
            e.bytes(genesis.as_ref())?;
            e.bytes(seed)?;
        }

        Ok(())
    }
}
